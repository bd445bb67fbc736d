//! User entity model.

use serde::{Deserialize, Serialize};

use regidesk_core::types::UserId;

use super::role::UserRole;

/// A registered user of the portal.
///
/// Immutable for the duration of a session; replaced wholesale on
/// re-authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Human-readable display name.
    pub display_name: String,
    /// User role (access control).
    pub role: UserRole,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
