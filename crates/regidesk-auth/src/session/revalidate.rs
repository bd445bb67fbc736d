//! Local credential revalidation.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use regidesk_core::result::AppResult;
use regidesk_core::traits::{RevalidationOutcome, SessionRevalidator};

use crate::token::{TokenClock, TokenState};

/// Revalidator that re-checks the stored credential locally.
///
/// No network round trip is made: the credential's own expiry claim is
/// re-read and classified. A credential still inside its lifetime is
/// confirmed as-is; an expired or undecodable one is rejected. Issuing a
/// fresh credential is out of scope here and belongs to whichever
/// revalidator fronts the identity backend.
#[derive(Debug, Clone, Copy)]
pub struct LocalRevalidator {
    clock: TokenClock,
}

impl LocalRevalidator {
    pub fn new(clock: TokenClock) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl SessionRevalidator for LocalRevalidator {
    async fn revalidate(&self, token: &str) -> AppResult<RevalidationOutcome> {
        let state = self.clock.classify(token, Utc::now());
        debug!(?state, "Local revalidation check");
        match state {
            TokenState::Valid | TokenState::ExpiringSoon { .. } => {
                Ok(RevalidationOutcome::Confirmed)
            }
            TokenState::Expired => Ok(RevalidationOutcome::Rejected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn token_with_exp(exp: i64) -> String {
        let payload = URL_SAFE_NO_PAD.encode(format!("{{\"exp\":{exp}}}"));
        format!("h.{payload}.s")
    }

    #[tokio::test]
    async fn test_live_token_confirmed() {
        let revalidator = LocalRevalidator::new(TokenClock::with_warning_window(300));
        let token = token_with_exp(Utc::now().timestamp() + 3600);
        assert_eq!(
            revalidator.revalidate(&token).await.unwrap(),
            RevalidationOutcome::Confirmed
        );
    }

    #[tokio::test]
    async fn test_expiring_token_still_confirmed() {
        let revalidator = LocalRevalidator::new(TokenClock::with_warning_window(300));
        let token = token_with_exp(Utc::now().timestamp() + 60);
        assert_eq!(
            revalidator.revalidate(&token).await.unwrap(),
            RevalidationOutcome::Confirmed
        );
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let revalidator = LocalRevalidator::new(TokenClock::with_warning_window(300));
        let token = token_with_exp(Utc::now().timestamp() - 60);
        assert_eq!(
            revalidator.revalidate(&token).await.unwrap(),
            RevalidationOutcome::Rejected
        );
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let revalidator = LocalRevalidator::new(TokenClock::with_warning_window(300));
        assert_eq!(
            revalidator.revalidate("not-a-token").await.unwrap(),
            RevalidationOutcome::Rejected
        );
    }
}
