use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::store::{union_value, KeyValueStore};

/// Whole store kept as one JSON object in a single file.
///
/// Every call re-reads the file. Writes go to a temp file in the same
/// directory which is fsynced and renamed over the target, so readers never
/// see a half-written document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path { &self.path }

    async fn load(&self) -> Result<Map<String, Value>> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", self.path.display())),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&text).with_context(|| format!("parsing {}", self.path.display()))
    }

    async fn save(&self, data: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        let file_name = self.path.file_name().and_then(|n| n.to_str()).unwrap_or("store.json");
        let temp_path = self.path.with_file_name(format!("{file_name}.tmp.{}", std::process::id()));

        let written = async {
            let mut file = fs::File::create(&temp_path).await.with_context(|| format!("creating {}", temp_path.display()))?;
            file.write_all(json.as_bytes()).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &self.path).await.with_context(|| format!("replacing {}", self.path.display()))
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }
        tracing::debug!(path = %self.path.display(), bytes = json.len(), "store written");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut data = self.load().await?;
        data.insert(key.to_string(), value);
        self.save(&data).await
    }

    async fn union(&self, key: &str, element: Value) -> Result<()> {
        let mut data = self.load().await?;
        let merged = union_value(key, data.remove(key), element)?;
        data.insert(key.to_string(), merged);
        self.save(&data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_and_empty_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("nested/todos.json")).await.unwrap();
        assert_eq!(store.get("todos").await.unwrap(), None);

        fs::write(store.path(), "").await.unwrap();
        assert_eq!(store.get("todos").await.unwrap(), None);
    }

    #[tokio::test]
    async fn writes_survive_reopen_and_keep_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        let store = JsonFileStore::open(&path).await.unwrap();
        store.set("other", json!(42)).await.unwrap();
        store.union("todos", json!({ "id": "a" })).await.unwrap();
        store.union("todos", json!({ "id": "b" })).await.unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(reopened.get("todos").await.unwrap(), Some(json!([{ "id": "a" }, { "id": "b" }])));
        assert_eq!(reopened.get("other").await.unwrap(), Some(json!(42)));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().filter_map(|e| e.ok()).collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn failed_replace_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "").unwrap();

        let store = JsonFileStore::open(&path).await.unwrap();
        assert!(store.save(&Map::new()).await.is_err());

        let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().filter_map(|e| e.ok()).map(|e| e.file_name()).collect();
        assert_eq!(names, vec![std::ffi::OsString::from("todos.json")]);
    }

    #[tokio::test]
    async fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todos.json");
        std::fs::write(&path, "not json").unwrap();
        let store = JsonFileStore::open(&path).await.unwrap();
        assert!(store.get("todos").await.is_err());
    }
}
