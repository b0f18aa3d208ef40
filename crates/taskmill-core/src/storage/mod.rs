//! Persistence layer: SQLite database and TOML configuration.

pub mod config;
pub mod migrations;
pub mod task_db;

pub use config::Config;
pub use task_db::TaskDb;

use std::path::PathBuf;

/// Returns the data directory, normally `~/.config/taskmill[-dev]/`.
///
/// `TASKMILL_DATA_DIR` overrides the location outright (used by tests);
/// `TASKMILL_ENV=dev` switches to the development directory.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn data_dir() -> crate::error::Result<PathBuf> {
    if let Ok(dir) = std::env::var("TASKMILL_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TASKMILL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("taskmill-dev")
    } else {
        base_dir.join("taskmill")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
