//! Whole-collection persistence for book records.
//!
//! Every call reads or replaces the full collection. There is no locking:
//! two concurrent read-modify-write cycles race and the last write wins.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use super::models::Book;
use crate::utils::generate_id;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed book collection in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize book collection: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Storage accessor handed to the handlers
#[async_trait]
pub trait BookStore: Send + Sync {
    /// The whole collection in insertion order; empty if nothing was stored yet
    async fn read_all(&self) -> Result<Vec<Book>, StoreError>;

    /// Replace the stored collection with `books`
    async fn write_all(&self, books: &[Book]) -> Result<(), StoreError>;
}

/// Stores the collection as a pretty-printed JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh sibling path per write, so concurrent writers never share one.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "books.json".into());
        name.push(format!(".{}.tmp", generate_id()));
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl BookStore for JsonFileStore {
    async fn read_all(&self) -> Result<Vec<Book>, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, books: &[Book]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(books)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        // Write beside the target and rename so readers never see a partial file.
        let temp_path = self.temp_path();
        let written = match tokio::fs::write(&temp_path, content).await {
            Ok(()) => tokio::fs::rename(&temp_path, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(self.io_error(e));
        }

        tracing::debug!(path = %self.path.display(), count = books.len(), "book collection written");
        Ok(())
    }
}

/// In-process store, used where no file should be touched
#[derive(Debug, Default)]
pub struct MemoryStore {
    books: Mutex<Vec<Book>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents without going through the async trait
    pub fn snapshot(&self) -> Vec<Book> {
        self.books
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn read_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.snapshot())
    }

    async fn write_all(&self, books: &[Book]) -> Result<(), StoreError> {
        let mut stored = self
            .books
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *stored = books.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::BookPayload;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn book(id: &str, name: &str) -> Book {
        let draft = BookPayload {
            name: Some(name.to_string()),
            publisher: Some("Gramedia".to_string()),
            page_count: Some(100.into()),
            read_page: Some(25.into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        Book::new(id.to_string(), draft, "2024-01-01T00:00:00.000Z".to_string())
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("books.json"));
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_file_reads_as_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("books.json");
        std::fs::write(&path, "  \n").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("books.json");
        std::fs::write(&path, "[{\"id\": ").unwrap();

        let store = JsonFileStore::new(&path);
        let err = store.read_all().await.unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[tokio::test]
    async fn write_replaces_whole_collection_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("books.json"));

        store
            .write_all(&[book("a", "One"), book("b", "Two"), book("c", "Three")])
            .await
            .unwrap();
        store.write_all(&[book("c", "Three"), book("a", "One")]).await.unwrap();

        let ids: Vec<String> = store
            .read_all()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert_eq!(dir_entries(temp_dir.path()), vec!["books.json"]);
    }

    #[test]
    fn temp_paths_are_unique_siblings() {
        let store = JsonFileStore::new("/data/books.json");
        let first = store.temp_path();
        let second = store.temp_path();

        assert_ne!(first, second);
        assert_eq!(first.parent(), Some(Path::new("/data")));
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("books.json.") && name.ends_with(".tmp"), "{}", name);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes_all_succeed() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileStore::new(temp_dir.path().join("books.json")));

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let id = format!("b{}", i);
                    store.write_all(&[book(&id, "Concurrent")]).await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        // Last writer wins, but the file is always one complete collection.
        assert_eq!(store.read_all().await.unwrap().len(), 1);
        assert_eq!(dir_entries(temp_dir.path()), vec!["books.json"]);
    }

    #[tokio::test]
    async fn written_file_is_indented_json_array() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("books.json");
        let store = JsonFileStore::new(&path);

        store.write_all(&[book("a", "One")]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("[\n  {\n    \"id\": \"a\""));
        assert!(content.contains("\"pageCount\": 100"));
    }

    #[tokio::test]
    async fn creates_missing_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("nested/data/books.json"));

        store.write_all(&[book("a", "One")]).await.unwrap();
        assert_eq!(store.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        store.write_all(&[book("a", "One")]).await.unwrap();
        assert_eq!(store.read_all().await.unwrap(), vec![book("a", "One")]);
        assert_eq!(store.snapshot().len(), 1);
    }
}
