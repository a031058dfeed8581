mod config;
mod kv;
mod local;

pub use config::{AppConfig, BackendConfig, LoggingConfig, ANON_KEY_ENV, BACKEND_URL_ENV};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use local::{keys, LocalStore};

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `POMOZOO_DATA_DIR` wins when set. Otherwise `~/.config/pomozoo`, or
/// `~/.config/pomozoo-dev` when `POMOZOO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("POMOZOO_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOZOO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomozoo-dev")
            } else {
                base_dir.join("pomozoo")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
