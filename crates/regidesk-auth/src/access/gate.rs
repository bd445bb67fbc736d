//! Role gate for protected operations.

use tracing::warn;

use regidesk_core::error::AppError;
use regidesk_core::result::AppResult;
use regidesk_entity::user::{User, UserRole};

use crate::session::SessionView;

/// Outcome of an access check.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessDecision {
    /// The caller holds a live session with sufficient privilege.
    Granted {
        /// The authenticated caller.
        user: User,
    },
    /// No live session exists.
    NoSession,
    /// The caller is authenticated but under-privileged.
    InsufficientRole {
        /// The minimum role the operation needs.
        required: UserRole,
        /// The role the caller actually holds.
        actual: UserRole,
    },
}

/// Gates protected operations on the caller's session and role.
///
/// Holds only a read-only [`SessionView`]; a denial never mutates session
/// state. Checks run before the guarded operation touches any record, so
/// a denied call leaves no trace beyond a log line.
#[derive(Debug, Clone)]
pub struct AccessGate {
    view: SessionView,
}

impl AccessGate {
    pub fn new(view: SessionView) -> Self {
        Self { view }
    }

    /// Decide whether the current caller may perform an operation
    /// requiring at least `required`.
    pub async fn check(&self, required: UserRole) -> AccessDecision {
        let Some(user) = self.view.current_user().await else {
            return AccessDecision::NoSession;
        };
        if user.role.has_at_least(&required) {
            AccessDecision::Granted { user }
        } else {
            warn!(
                username = %user.username,
                actual = %user.role,
                required = %required,
                "Access denied: insufficient role"
            );
            AccessDecision::InsufficientRole {
                required,
                actual: user.role,
            }
        }
    }

    /// Like [`AccessGate::check`], but maps denials to errors for callers
    /// that propagate with `?`.
    pub async fn require(&self, required: UserRole) -> AppResult<User> {
        match self.check(required).await {
            AccessDecision::Granted { user } => Ok(user),
            AccessDecision::NoSession => Err(AppError::authentication("No live session")),
            AccessDecision::InsufficientRole { required, actual } => Err(AppError::authorization(
                format!("Operation requires role {required}, caller has {actual}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::Utc;

    use regidesk_core::error::ErrorKind;
    use regidesk_core::types::UserId;
    use regidesk_entity::session::Session;
    use regidesk_storage::MemorySessionBackend;

    use crate::session::SessionStore;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: UserId::new(),
            username: "registrar".into(),
            display_name: "Registrar Staff".into(),
            role,
        }
    }

    async fn gate_for(role: Option<UserRole>) -> AccessGate {
        let store = SessionStore::new(Arc::new(MemorySessionBackend::new()));
        if let Some(role) = role {
            store
                .set(Session::new("a.b.c", user_with_role(role), Utc::now()))
                .await
                .unwrap();
        }
        AccessGate::new(store.view())
    }

    #[tokio::test]
    async fn test_no_session_is_denied() {
        let gate = gate_for(None).await;
        assert_eq!(gate.check(UserRole::User).await, AccessDecision::NoSession);
        let err = gate.require(UserRole::User).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_admin_passes_admin_gate() {
        let gate = gate_for(Some(UserRole::Admin)).await;
        assert!(matches!(
            gate.check(UserRole::Admin).await,
            AccessDecision::Granted { .. }
        ));
    }

    #[tokio::test]
    async fn test_regular_user_denied_admin_gate() {
        let gate = gate_for(Some(UserRole::User)).await;
        assert_eq!(
            gate.check(UserRole::Admin).await,
            AccessDecision::InsufficientRole {
                required: UserRole::Admin,
                actual: UserRole::User,
            }
        );
        let err = gate.require(UserRole::Admin).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_admin_passes_user_gate() {
        let gate = gate_for(Some(UserRole::Admin)).await;
        assert!(matches!(
            gate.check(UserRole::User).await,
            AccessDecision::Granted { .. }
        ));
    }
}
