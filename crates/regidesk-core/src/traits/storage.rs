//! Key-value backend trait for the persisted session.

use async_trait::async_trait;

use crate::result::AppResult;

/// Durable key-value storage holding the persisted session.
///
/// Implementations are process-local (a JSON file on disk, or memory for
/// tests). The session layout written through this trait uses the keys
/// `token`, `user`, and `lastActivity`.
#[async_trait]
pub trait SessionBackend: Send + Sync + 'static {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write `value` under `key`, replacing any existing value.
    async fn put(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove the value stored under `key`. Removing an absent key is a no-op.
    async fn remove(&self, key: &str) -> AppResult<()>;
}
