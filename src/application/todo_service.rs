use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::Result;
use crate::domain::id::{IdGenerator, UuidGenerator};
use crate::domain::store::KeyValueStore;
use crate::domain::todo::{Todo, TodoDraft};
use crate::domain::validation::{validate, validate_existing, IdCheck};

/// Store key holding the whole collection.
pub const TODOS_KEY: &str = "todos";

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn add(&self, input: TodoDraft) -> Result<Todo>;
    async fn get_all(&self) -> Result<Vec<Todo>>;
    async fn update(&self, input: TodoDraft) -> Result<Vec<Todo>>;
    async fn override_all(&self, todos: Vec<TodoDraft>) -> Result<Vec<Todo>>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<S: KeyValueStore, G: IdGenerator = UuidGenerator> {
    store: S,
    ids: G,
}

impl<S: KeyValueStore> TodoServiceImpl<S> {
    pub fn new(store: S) -> Self { Self { store, ids: UuidGenerator } }
}

impl<S: KeyValueStore, G: IdGenerator> TodoServiceImpl<S, G> {
    pub fn with_ids(store: S, ids: G) -> Self { Self { store, ids } }

    /// Stored collection; a missing or `null` value reads as empty.
    async fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        match self.store.get(TODOS_KEY).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    /// Current collection, read leniently so malformed entries reach validation.
    /// Elements that are not records at all become empty drafts.
    async fn snapshot(&self) -> Result<Vec<TodoDraft>> {
        let items: Vec<Value> = self.load().await?;
        Ok(items.into_iter().map(|item| serde_json::from_value(item).unwrap_or_default()).collect())
    }
}

#[async_trait]
impl<S: KeyValueStore, G: IdGenerator> TodoService for TodoServiceImpl<S, G> {
    async fn add(&self, input: TodoDraft) -> Result<Todo> {
        let todo = validate(&input, IdCheck::Skip)?.with_id(self.ids.next_id());
        self.store.union(TODOS_KEY, serde_json::to_value(&todo)?).await?;
        tracing::debug!(id = %todo.id, "todo added");
        Ok(todo)
    }

    async fn get_all(&self) -> Result<Vec<Todo>> {
        self.load().await
    }

    async fn update(&self, input: TodoDraft) -> Result<Vec<Todo>> {
        // Replacement is not validated here; override_all rejects it if needed.
        let replaced = self
            .snapshot()
            .await?
            .into_iter()
            .map(|current| if current.id == input.id { input.clone() } else { current })
            .collect();
        self.override_all(replaced).await
    }

    async fn override_all(&self, todos: Vec<TodoDraft>) -> Result<Vec<Todo>> {
        let snapshot = self.snapshot().await?;
        let validated = todos
            .iter()
            .map(|candidate| validate_existing(candidate, &snapshot))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.store.set(TODOS_KEY, serde_json::to_value(&validated)?).await?;
        tracing::debug!(count = validated.len(), "todos replaced");
        Ok(validated)
    }
}
