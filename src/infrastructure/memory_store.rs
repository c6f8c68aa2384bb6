use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::store::{union_value, KeyValueStore};

/// Process-local store; clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<String, Value>>>,
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> {
        self.items.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn union(&self, key: &str, element: Value) -> anyhow::Result<()> {
        let mut map = self.items.lock().await;
        let merged = union_value(key, map.get(key).cloned(), element)?;
        map.insert(key.to_string(), merged);
        Ok(())
    }
}
