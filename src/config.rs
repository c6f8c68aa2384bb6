//! Runtime settings read from the environment (and `.env`, via dotenvy).

use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db";
pub const DEFAULT_LOG_FILE: &str = "todolist.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Store location, see `infrastructure::open_store`.
    pub database_url: String,
    /// Where tracing output goes; the terminal belongs to the UI.
    pub log_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            database_url: non_empty("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            log_file: non_empty("TODO_LOG_FILE").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}
