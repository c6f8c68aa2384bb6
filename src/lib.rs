pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Sends tracing output to `config.log_file`, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing(config: &config::Config) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("opening log file {}", config.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
