mod accounts;
mod config;
pub mod database;
mod kv;

pub use accounts::{AccountStore, ALL_USERS_KEY, CURRENT_USER_KEY};
pub use config::{AuthConfig, Config, HintConfig, ScreenTimeConfig, TimingConfig};
pub use database::Database;
pub use kv::{KeyValueStore, MemoryStore};

use std::path::PathBuf;

use crate::error::{ConfigError, CoreError};

/// Returns the data directory, creating it if needed.
///
/// `CODEPLAY_DATA_DIR` overrides the location. Otherwise it is
/// `~/.config/codeplay[-dev]/`, with `CODEPLAY_ENV=dev` selecting the
/// development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("CODEPLAY_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("CODEPLAY_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("codeplay-dev")
            } else {
                base_dir.join("codeplay")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
