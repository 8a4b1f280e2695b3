//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level Storyloom configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryloomConfig {
    /// HTTP server port.
    pub port: u16,
    /// Root data directory (e.g., `data/`).
    pub data_dir: PathBuf,
    /// SQLite database file (`data/storyloom.db`).
    pub db_path: PathBuf,
}

impl StoryloomConfig {
    /// Create configuration from environment and defaults.
    /// Creates the data directory if needed.
    pub fn from_env() -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let data_dir = std::env::var("STORYLOOM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Self::with_data_dir(port, data_dir)
    }

    /// Build a configuration rooted at an explicit data directory.
    pub fn with_data_dir(port: u16, data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        let db_path = data_dir.join("storyloom.db");

        Ok(Self {
            port,
            data_dir,
            db_path,
        })
    }
}
