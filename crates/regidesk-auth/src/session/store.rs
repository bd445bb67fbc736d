//! Persisted session store with single-writer discipline.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use regidesk_core::result::AppResult;
use regidesk_core::traits::SessionBackend;
use regidesk_entity::session::Session;
use regidesk_entity::user::User;

/// Backend key holding the raw credential string.
const KEY_TOKEN: &str = "token";
/// Backend key holding the serialized user (JSON text).
const KEY_USER: &str = "user";
/// Backend key holding the last-activity instant (epoch milliseconds).
const KEY_LAST_ACTIVITY: &str = "lastActivity";

struct Inner {
    backend: Arc<dyn SessionBackend>,
    current: RwLock<Option<Session>>,
}

/// Writable handle to the current session.
///
/// Exactly one writer exists per client: the session guard (plus the
/// login/logout flow it hosts). Every other component receives a
/// read-only [`SessionView`], making the single-writer discipline a
/// property of construction rather than convention.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

/// Read-only view of the current session.
#[derive(Clone)]
pub struct SessionView {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for SessionView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionView").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store over the given backend. The in-memory state starts
    /// empty; call [`SessionStore::load`] to hydrate from durable storage.
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                current: RwLock::new(None),
            }),
        }
    }

    /// Hydrate the session from durable storage.
    ///
    /// Absence of the token or user entries, or a user entry that is not
    /// valid JSON, reads as "no session". A missing or malformed
    /// last-activity value falls back to the current instant so the
    /// inactivity timer starts fresh rather than firing immediately.
    pub async fn load(&self) -> AppResult<Option<Session>> {
        let token = self.inner.backend.get(KEY_TOKEN).await?;
        let user_json = self.inner.backend.get(KEY_USER).await?;

        let session = match (token, user_json) {
            (Some(token), Some(user_json)) => match serde_json::from_str::<User>(&user_json) {
                Ok(user) => {
                    let last_activity = self
                        .inner
                        .backend
                        .get(KEY_LAST_ACTIVITY)
                        .await?
                        .and_then(|v| v.parse::<i64>().ok())
                        .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
                        .unwrap_or_else(Utc::now);
                    Some(Session {
                        token,
                        user,
                        last_activity,
                    })
                }
                Err(e) => {
                    warn!(error = %e, "Stored user entry is not valid JSON; treating as no session");
                    None
                }
            },
            _ => None,
        };

        *self.inner.current.write().await = session.clone();
        Ok(session)
    }

    /// The current session, if any.
    pub async fn get(&self) -> Option<Session> {
        self.inner.current.read().await.clone()
    }

    /// Replace the current session, superseding any prior one.
    pub async fn set(&self, session: Session) -> AppResult<()> {
        self.inner.backend.put(KEY_TOKEN, &session.token).await?;
        self.inner
            .backend
            .put(KEY_USER, &serde_json::to_string(&session.user)?)
            .await?;
        self.inner
            .backend
            .put(
                KEY_LAST_ACTIVITY,
                &session.last_activity.timestamp_millis().to_string(),
            )
            .await?;
        *self.inner.current.write().await = Some(session);
        Ok(())
    }

    /// Destroy the current session. Clearing an empty store is a no-op.
    pub async fn clear(&self) -> AppResult<()> {
        self.inner.backend.remove(KEY_TOKEN).await?;
        self.inner.backend.remove(KEY_USER).await?;
        self.inner.backend.remove(KEY_LAST_ACTIVITY).await?;
        *self.inner.current.write().await = None;
        Ok(())
    }

    /// Advance the last-activity instant only. No-op without a session.
    pub async fn touch(&self, now: DateTime<Utc>) -> AppResult<()> {
        let mut guard = self.inner.current.write().await;
        if let Some(session) = guard.as_mut() {
            session.last_activity = now;
            self.inner
                .backend
                .put(KEY_LAST_ACTIVITY, &now.timestamp_millis().to_string())
                .await?;
        }
        Ok(())
    }

    /// A read-only view over the same session state.
    pub fn view(&self) -> SessionView {
        SessionView {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl SessionView {
    /// The current session, if any.
    pub async fn get(&self) -> Option<Session> {
        self.inner.current.read().await.clone()
    }

    /// Whether a live session exists.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.current.read().await.is_some()
    }

    /// The currently authenticated user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.inner
            .current
            .read()
            .await
            .as_ref()
            .map(|s| s.user.clone())
    }
}
