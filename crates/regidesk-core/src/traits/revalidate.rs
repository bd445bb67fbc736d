//! Session revalidation trait.

use async_trait::async_trait;

use crate::result::AppResult;

/// Outcome of a session revalidation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevalidationOutcome {
    /// The stored credential is still valid; nothing to replace.
    Confirmed,
    /// The credential was refreshed; the new token replaces the stored one.
    Refreshed {
        /// The replacement credential string.
        token: String,
    },
    /// The backend rejected the credential. Treated the same as expiry.
    Rejected,
}

/// External collaborator that revalidates the current credential.
///
/// Called when the user chooses to extend an expiring session. A transport
/// failure propagates as an `AppError` and the caller treats it exactly
/// like [`RevalidationOutcome::Rejected`] (fail-closed, never retried
/// silently).
#[async_trait]
pub trait SessionRevalidator: Send + Sync + 'static {
    /// Revalidate the given credential.
    async fn revalidate(&self, token: &str) -> AppResult<RevalidationOutcome>;
}
