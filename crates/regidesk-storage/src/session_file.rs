//! File-backed session key-value store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use regidesk_core::error::AppError;
use regidesk_core::result::AppResult;
use regidesk_core::traits::SessionBackend;

/// Durable key-value store persisting the session as a single JSON file.
///
/// The file holds a flat string-to-string object (`token`, `user`,
/// `lastActivity`). Writes go through a temp file followed by a rename so
/// a crash mid-write never leaves a truncated session behind. A missing
/// file reads as an empty store.
///
/// All operations serialize on an internal mutex; this backend is
/// process-local and explicitly not shared across clients.
#[derive(Debug)]
pub struct FileSessionBackend {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionBackend {
    /// Create a backend persisting to `path`. The file is created lazily
    /// on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The file this backend persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> AppResult<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::with_source(
                    regidesk_core::error::ErrorKind::Storage,
                    format!("Corrupt session file '{}': {e}", self.path.display()),
                    e,
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::storage(format!(
                "Failed to read session file '{}': {e}",
                self.path.display()
            ))),
        }
    }

    async fn write_map(&self, map: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionBackend for FileSessionBackend {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}
