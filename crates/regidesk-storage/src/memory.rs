//! In-memory session backend for tests.

use async_trait::async_trait;
use dashmap::DashMap;

use regidesk_core::result::AppResult;
use regidesk_core::traits::SessionBackend;

/// In-memory twin of the file-backed session store.
///
/// Behaves identically to [`crate::FileSessionBackend`] minus durability.
#[derive(Debug, Default)]
pub struct MemorySessionBackend {
    entries: DashMap<String, String>,
}

impl MemorySessionBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBackend for MemorySessionBackend {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn put(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
