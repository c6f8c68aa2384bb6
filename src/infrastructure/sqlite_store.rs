use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Executor, Pool, Row, Sqlite};

use crate::domain::store::{union_value, KeyValueStore};

#[derive(Clone)]
pub struct SqliteStore {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:");
        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        if !in_memory {
            if let Some(dir) = database_file(database_url).and_then(Path::parent).filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
            }
        }

        let options = SqlitePoolOptions::new();
        // Each in-memory connection is its own database; keep exactly one alive.
        let options = if in_memory {
            options.max_connections(1).min_connections(1).idle_timeout(None).max_lifetime(None)
        } else {
            options.max_connections(5)
        };
        let pool = options.connect_with(connect_options).await?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

/// Path part of a `sqlite:` url, without query parameters.
fn database_file(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://").or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty()).then(|| Path::new(path))
}

async fn read_value<'e, E: Executor<'e, Database = Sqlite>>(executor: E, key: &str) -> Result<Option<Value>> {
    let row = sqlx::query("SELECT value FROM kv WHERE key = ?1")
        .bind(key)
        .fetch_optional(executor)
        .await?;
    match row {
        Some(row) => {
            let text: String = row.get("value");
            Ok(Some(serde_json::from_str(&text)?))
        }
        None => Ok(None),
    }
}

async fn write_value<'e, E: Executor<'e, Database = Sqlite>>(executor: E, key: &str, value: &Value) -> Result<()> {
    sqlx::query(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(serde_json::to_string(value)?)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        read_value(&*self.pool, key).await
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        write_value(&*self.pool, key, &value).await?;
        tracing::debug!(key, "value set");
        Ok(())
    }

    async fn union(&self, key: &str, element: Value) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let current = read_value(&mut *tx, key).await?;
        let merged = union_value(key, current, element)?;
        write_value(&mut *tx, key, &merged).await?;
        tx.commit().await?;
        tracing::debug!(key, "value merged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> SqliteStore {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.init().await.unwrap();
        store
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = store().await;
        assert_eq!(store.get("todos").await.unwrap(), None);
        store.set("todos", json!([{ "id": "a" }])).await.unwrap();
        store.set("todos", json!([])).await.unwrap();
        assert_eq!(store.get("todos").await.unwrap(), Some(json!([])));
    }

    #[tokio::test]
    async fn union_accumulates() {
        let store = store().await;
        store.union("todos", json!({ "id": "a" })).await.unwrap();
        store.union("todos", json!({ "id": "b" })).await.unwrap();
        assert_eq!(store.get("todos").await.unwrap(), Some(json!([{ "id": "a" }, { "id": "b" }])));
    }

    #[tokio::test]
    async fn connect_creates_missing_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested/todos.db");
        let store = SqliteStore::connect(&format!("sqlite://{}?mode=rwc", db_path.display())).await.unwrap();
        store.init().await.unwrap();
        store.set("todos", json!([])).await.unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn database_file_strips_scheme_and_query() {
        assert_eq!(database_file("sqlite://data/todos.db?mode=rwc"), Some(Path::new("data/todos.db")));
        assert_eq!(database_file("sqlite:todos.db"), Some(Path::new("todos.db")));
        assert_eq!(database_file("postgres://x"), None);
    }

    #[tokio::test]
    async fn union_on_scalar_fails_and_rolls_back() {
        let store = store().await;
        store.set("todos", json!("oops")).await.unwrap();
        assert!(store.union("todos", json!(1)).await.is_err());
        assert_eq!(store.get("todos").await.unwrap(), Some(json!("oops")));
    }
}
