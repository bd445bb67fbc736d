//! Claims object embedded in the middle credential segment.

use serde::{Deserialize, Serialize};

/// Claims decoded from a credential's payload segment.
///
/// The credential is consumed, never produced: only the fields needed to
/// interpret it are modelled, everything else is ignored. Every field is
/// optional so a structurally valid JSON object with missing claims still
/// parses; the absence of `exp` is handled fail-closed by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Expiry instant, seconds since the Unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issued-at instant, seconds since the Unix epoch.
    #[serde(default)]
    pub iat: Option<i64>,
    /// Subject — the issuing user's identity.
    #[serde(default)]
    pub sub: Option<String>,
    /// Role claim, if the issuer embeds one.
    #[serde(default)]
    pub role: Option<String>,
}
