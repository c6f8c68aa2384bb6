pub mod json_file_store;
pub mod memory_store;
pub mod sqlite_store;

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::domain::store::KeyValueStore;
use json_file_store::JsonFileStore;
use memory_store::MemoryStore;
use sqlite_store::SqliteStore;

/// Opens and initializes the backend named by `url`:
/// `memory`, `sqlite:...`, `file://path` or a `*.json` path.
pub async fn open_store(url: &str) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = if url == "memory" || url == "memory:" {
        Arc::new(MemoryStore::default())
    } else if url.starts_with("sqlite:") {
        Arc::new(SqliteStore::connect(url).await?)
    } else if let Some(path) = url.strip_prefix("file://") {
        Arc::new(JsonFileStore::open(path).await?)
    } else if url.ends_with(".json") {
        Arc::new(JsonFileStore::open(url).await?)
    } else {
        bail!("unsupported store url: {url}");
    };
    store.init().await?;
    tracing::info!(url, "store opened");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn picks_backend_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("todos.json");
        let db_path = dir.path().join("sub/todos.db");

        for url in [
            "memory".to_string(),
            "sqlite::memory:".to_string(),
            format!("sqlite://{}", db_path.display()),
            format!("file://{}", json_path.display()),
        ] {
            let store = open_store(&url).await.unwrap();
            store.set("k", json!(1)).await.unwrap();
            assert_eq!(store.get("k").await.unwrap(), Some(json!(1)), "{url}");
        }
        assert!(db_path.exists());
        assert!(json_path.exists());
    }

    #[tokio::test]
    async fn rejects_unknown_scheme() {
        assert!(open_store("redis://localhost").await.is_err());
    }
}
