pub mod books;

use std::sync::Arc;

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

use books::store::JsonFileStore;

/// Register every application module with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let store = Arc::new(JsonFileStore::new(&settings.storage.books_path));
    registry.register(books::create_module(store))?;
    Ok(())
}
