//! Bookshelf application library
//!
//! Wires the application modules into the kernel registry and runs the HTTP server.

pub mod modules;
pub mod utils;

use anyhow::Context;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Registry with every application module registered
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings)?;
    Ok(registry)
}

/// Initialize and start all modules, serve until shutdown, then stop them.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(env = ?settings.environment, "bookshelf bootstrap starting");

    let registry = build_registry(&settings)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("bookshelf bootstrap complete");

    let served = bookshelf_http::start_server(&registry, &settings)
        .await
        .with_context(|| "HTTP server terminated with an error");

    // Stop modules even if the server failed, then report the first error.
    let stopped = registry.stop_all().await;
    served?;
    stopped
}
