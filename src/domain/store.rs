use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use serde_json::Value;

/// Key-value persistence backing the todo list.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()> { Ok(()) }
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>>;
    /// Replaces the value at `key`; durable once this returns.
    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()>;
    /// Appends `element` to the array at `key`, creating the array if absent.
    async fn union(&self, key: &str, element: Value) -> anyhow::Result<()>;
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn init(&self) -> anyhow::Result<()> { (**self).init().await }
    async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> { (**self).get(key).await }
    async fn set(&self, key: &str, value: Value) -> anyhow::Result<()> { (**self).set(key, value).await }
    async fn union(&self, key: &str, element: Value) -> anyhow::Result<()> { (**self).union(key, element).await }
}

/// Merges `element` into the array held in `current`. An equal element already
/// present is not added twice.
pub fn union_value(key: &str, current: Option<Value>, element: Value) -> anyhow::Result<Value> {
    let mut items = match current {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => bail!("value at key {key:?} is not an array"),
    };
    if !items.contains(&element) {
        items.push(element);
    }
    Ok(Value::Array(items))
}
