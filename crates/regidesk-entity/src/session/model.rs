//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;

/// The live pairing of a credential, a user identity, and activity recency.
///
/// Created on successful login, mutated on credential refresh and on user
/// activity, destroyed on logout, credential expiry, or inactivity
/// timeout. Exactly one session is live per client at a time; creating a
/// new one supersedes the prior one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// The raw opaque credential string.
    pub token: String,
    /// The authenticated user.
    pub user: User,
    /// When the user last interacted with the client.
    pub last_activity: DateTime<Utc>,
}

impl Session {
    /// Create a session at login time.
    pub fn new(token: impl Into<String>, user: User, now: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            user,
            last_activity: now,
        }
    }

    /// Seconds elapsed since the last recorded user activity.
    pub fn idle_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_activity).num_seconds().max(0)
    }
}
