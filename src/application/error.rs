use thiserror::Error;

use crate::domain::validation::ValidationError;

pub type Result<T, E = TodoError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),

    #[error("Malformed todo data: {0}")]
    Codec(#[from] serde_json::Error),
}

impl TodoError {
    pub fn validation(&self) -> Option<ValidationError> {
        match self {
            TodoError::Validation(e) => Some(*e),
            _ => None,
        }
    }
}
