use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TodoId(pub String);

impl TodoId {
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for TodoId {
    fn from(s: &str) -> Self { Self(s.to_string()) }
}

impl From<String> for TodoId {
    fn from(s: String) -> Self { Self(s) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub todo: String,
    pub complete: bool,
}

/// Candidate record handed to the service, possibly incomplete or malformed.
///
/// Fields that are missing or carry the wrong JSON type deserialize to `None`
/// so that validation, not decoding, reports them.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TodoDraft {
    #[serde(default, deserialize_with = "loose::id")]
    pub id: Option<TodoId>,
    #[serde(default, deserialize_with = "loose::string")]
    pub todo: Option<String>,
    #[serde(default, deserialize_with = "loose::boolean")]
    pub complete: Option<bool>,
}

impl TodoDraft {
    pub fn new(todo: impl Into<String>, complete: bool) -> Self {
        Self { id: None, todo: Some(todo.into()), complete: Some(complete) }
    }

    pub fn with_id(mut self, id: impl Into<TodoId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl From<Todo> for TodoDraft {
    fn from(t: Todo) -> Self {
        Self { id: Some(t.id), todo: Some(t.todo), complete: Some(t.complete) }
    }
}

mod loose {
    use super::*;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? { Value::String(s) => Some(s), _ => None })
    }

    pub fn boolean<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? { Value::Bool(b) => Some(b), _ => None })
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<TodoId>, D::Error> {
        string(d).map(|s| s.map(TodoId))
    }
}
