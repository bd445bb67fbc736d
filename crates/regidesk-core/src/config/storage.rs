//! Durable storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Durable local storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all durable data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// File name of the persisted session, relative to `data_root`.
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

impl StorageConfig {
    /// Full path to the persisted session file.
    pub fn session_path(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join(&self.session_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            session_file: default_session_file(),
        }
    }
}

fn default_data_root() -> String {
    "data".to_string()
}

fn default_session_file() -> String {
    "session.json".to_string()
}
