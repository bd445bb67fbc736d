//! Fail-closed expiry classification of bearer credentials.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};

use regidesk_core::config::session::SessionConfig;
use regidesk_entity::session::TokenClaims;

/// Classification of a credential at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// The credential is valid and outside the warning window.
    Valid,
    /// The credential expires within the warning window.
    ExpiringSoon {
        /// Exact seconds remaining, used to seed the countdown display.
        seconds_left: u64,
    },
    /// The credential has expired or could not be interpreted.
    Expired,
}

/// Decodes a credential's expiry instant and classifies it.
///
/// The credential is an opaque string of three dot-separated base64url
/// segments; only the middle segment is decoded, as JSON, to extract the
/// `exp` claim. This type never performs I/O and never verifies a
/// signature — credentials are interpreted here, not authenticated.
///
/// Any decoding or parsing failure, or a missing `exp`, classifies as
/// `Expired`: fail-closed, never fail-open.
#[derive(Debug, Clone, Copy)]
pub struct TokenClock {
    warning_window_seconds: u64,
}

impl TokenClock {
    /// Create a clock from session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            warning_window_seconds: config.warning_window_seconds,
        }
    }

    /// Create a clock with an explicit warning window.
    pub fn with_warning_window(warning_window_seconds: u64) -> Self {
        Self {
            warning_window_seconds,
        }
    }

    /// Classify `token` as of `now`. Pure and deterministic.
    pub fn classify(&self, token: &str, now: DateTime<Utc>) -> TokenState {
        let Some(claims) = decode_claims(token) else {
            return TokenState::Expired;
        };
        let Some(exp) = claims.exp else {
            return TokenState::Expired;
        };

        let remaining = exp - now.timestamp();
        if remaining <= 0 {
            TokenState::Expired
        } else if (remaining as u64) <= self.warning_window_seconds {
            TokenState::ExpiringSoon {
                seconds_left: remaining as u64,
            }
        } else {
            TokenState::Valid
        }
    }
}

/// Decode the claims object from a credential's middle segment.
///
/// Returns `None` on any structural or parse failure.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }
    let payload = decode_segment(segments[1])?;
    serde_json::from_slice(&payload).ok()
}

/// Decode one base64url segment, tolerating standard-alphabet and padded
/// encodings from older issuers.
fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    let trimmed = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
        .ok()
}
