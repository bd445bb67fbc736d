//! Session lifecycle state machine.
//!
//! [`SessionGuard`] owns the sole writer handle to the session store and
//! applies every lifecycle transition: login, expiry warning, extension,
//! inactivity timeout, and logout. It is a plain state machine driven by
//! explicit method calls with an explicit `now`; the async runner in
//! [`super::runner`] supplies the timers.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use regidesk_core::config::session::SessionConfig;
use regidesk_core::events::SessionEvent;
use regidesk_core::result::AppResult;
use regidesk_core::traits::RevalidationOutcome;
use regidesk_entity::session::Session;
use regidesk_entity::user::User;

use crate::token::{TokenClock, TokenState};

use super::store::SessionStore;

/// Capacity of the lifecycle event broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Lifecycle state of the guarded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// No live session.
    LoggedOut,
    /// A live session outside the expiry warning window.
    Active,
    /// The credential expires soon; the warning dialog is open.
    Warning {
        /// Seconds remaining at the last expiry check.
        seconds_left: u64,
    },
    /// The user chose to extend; revalidation is in flight.
    Extending,
}

/// Why a session was force-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutCause {
    /// The user logged out explicitly.
    Manual,
    /// The credential expired.
    TokenExpired,
    /// The revalidation backend rejected the credential (or the call failed).
    RevalidationRejected,
    /// The inactivity timer fired.
    Inactivity,
}

/// Message driving the guard from outside the runner loop.
#[derive(Debug)]
pub enum GuardEvent {
    /// The user interacted with the client.
    Activity,
    /// The user asked to extend the expiring session.
    ExtendRequested,
    /// The user asked to log out.
    LogoutRequested,
    /// A spawned revalidation task finished.
    ExtendResolved {
        /// The extension epoch the task was started under.
        epoch: u64,
        /// What the revalidator decided, or the transport error.
        outcome: AppResult<RevalidationOutcome>,
    },
}

/// The session lifecycle state machine.
///
/// Holds the single [`SessionStore`] writer. All transitions are
/// synchronous with respect to the caller; timer scheduling lives in the
/// runner. Each method takes `now` explicitly so transitions are
/// deterministic under test.
pub struct SessionGuard {
    store: SessionStore,
    clock: TokenClock,
    inactivity_timeout_seconds: u64,
    state: GuardState,
    /// Bumped on every logout and every applied extension result. A
    /// revalidation task carries the epoch it was started under; a result
    /// arriving with a stale epoch is discarded, so a late extension can
    /// never resurrect a session that ended while it was in flight.
    epoch: u64,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionGuard {
    pub fn new(store: SessionStore, clock: TokenClock, config: &SessionConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            clock,
            inactivity_timeout_seconds: config.inactivity_timeout_minutes * 60,
            state: GuardState::LoggedOut,
            epoch: 0,
            events,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Whether the guard has reached its terminal state.
    pub fn is_terminal(&self) -> bool {
        self.state == GuardState::LoggedOut
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// A sender handle for the lifecycle event channel.
    pub(crate) fn event_sender(&self) -> broadcast::Sender<SessionEvent> {
        self.events.clone()
    }

    /// The configured inactivity timeout.
    pub fn inactivity_timeout_seconds(&self) -> u64 {
        self.inactivity_timeout_seconds
    }

    /// Read-only access to the underlying store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Create a session for a freshly authenticated user.
    ///
    /// An expired or undecodable credential is refused outright rather
    /// than creating a session that the next poll would immediately end.
    pub async fn login(
        &mut self,
        token: impl Into<String>,
        user: User,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let token = token.into();
        if self.clock.classify(&token, now) == TokenState::Expired {
            return Err(regidesk_core::error::AppError::authentication(
                "Credential is already expired",
            ));
        }

        let user_id = user.id;
        self.store.set(Session::new(token, user, now)).await?;
        self.state = GuardState::Active;
        info!(%user_id, "Session created");
        self.emit(SessionEvent::Created {
            user_id: user_id.into_uuid(),
        });
        Ok(())
    }

    /// Adopt a session restored from durable storage.
    ///
    /// Call once at startup, after [`SessionStore::load`] and before the
    /// runner starts. The restored credential is classified first: an
    /// expired credential clears the persisted session instead of
    /// adopting it, so a stale session on disk never outlives its token.
    ///
    /// Returns `true` when a live session was adopted.
    pub async fn resume(&mut self, now: DateTime<Utc>) -> AppResult<bool> {
        if !self.is_terminal() {
            return Ok(true);
        }
        let Some(session) = self.store.get().await else {
            return Ok(false);
        };
        if self.clock.classify(&session.token, now) == TokenState::Expired {
            warn!("Restored session credential is expired; discarding");
            self.store.clear().await?;
            self.emit(SessionEvent::Expired);
            return Ok(false);
        }

        let user_id = session.user.id;
        self.state = GuardState::Active;
        info!(%user_id, "Session resumed");
        self.emit(SessionEvent::Restored {
            user_id: user_id.into_uuid(),
        });
        Ok(true)
    }

    /// Periodic credential expiry check.
    ///
    /// Drives the `Active -> Warning -> LoggedOut` progression. While the
    /// warning is showing, each check refreshes the remaining-seconds
    /// figure; a credential found refreshed back out of the window closes
    /// the warning.
    pub async fn on_tick(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        let Some(session) = self.store.get().await else {
            return Ok(());
        };
        if self.is_terminal() {
            return Ok(());
        }

        match self.clock.classify(&session.token, now) {
            TokenState::Valid => {
                if matches!(self.state, GuardState::Warning { .. }) {
                    debug!("Credential left the warning window; dismissing warning");
                    self.state = GuardState::Active;
                    self.emit(SessionEvent::Extended);
                }
            }
            TokenState::ExpiringSoon { seconds_left } => match self.state {
                GuardState::Active => {
                    info!(seconds_left, "Credential entering expiry warning window");
                    self.state = GuardState::Warning { seconds_left };
                    self.emit(SessionEvent::WarningShown { seconds_left });
                }
                GuardState::Warning { .. } => {
                    self.state = GuardState::Warning { seconds_left };
                }
                // An in-flight extension owns the next transition.
                GuardState::Extending | GuardState::LoggedOut => {}
            },
            TokenState::Expired => {
                self.logout(LogoutCause::TokenExpired, now).await?;
            }
        }
        Ok(())
    }

    /// Record user activity, resetting the inactivity clock.
    pub async fn on_activity(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_terminal() {
            return Ok(());
        }
        self.store.touch(now).await
    }

    /// Begin an extension in response to the user accepting the warning.
    ///
    /// Returns the epoch and credential the revalidation task should run
    /// under, or `None` when no warning is showing (the request is stale:
    /// the session already ended or was already extended).
    pub async fn begin_extend(&mut self) -> AppResult<Option<(u64, String)>> {
        if !matches!(self.state, GuardState::Warning { .. }) {
            debug!(state = ?self.state, "Ignoring extension request outside warning state");
            return Ok(None);
        }
        let Some(session) = self.store.get().await else {
            return Ok(None);
        };
        self.state = GuardState::Extending;
        Ok(Some((self.epoch, session.token)))
    }

    /// Apply the result of a revalidation task.
    ///
    /// A result carrying a stale epoch is discarded: the session it was
    /// meant for already ended (or was already extended by a newer
    /// request), and a late success must not resurrect it.
    pub async fn on_extend_resolved(
        &mut self,
        epoch: u64,
        outcome: AppResult<RevalidationOutcome>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if epoch != self.epoch {
            debug!(
                stale_epoch = epoch,
                current_epoch = self.epoch,
                "Discarding late extension result"
            );
            return Ok(());
        }
        self.epoch += 1;

        match outcome {
            Ok(RevalidationOutcome::Confirmed) => {
                info!("Session extended; credential confirmed");
                self.state = GuardState::Active;
                self.emit(SessionEvent::Extended);
                Ok(())
            }
            Ok(RevalidationOutcome::Refreshed { token }) => {
                if self.clock.classify(&token, now) == TokenState::Expired {
                    warn!("Revalidator returned an already-expired credential");
                    return self.logout(LogoutCause::RevalidationRejected, now).await;
                }
                if let Some(mut session) = self.store.get().await {
                    session.token = token;
                    self.store.set(session).await?;
                }
                info!("Session extended; credential refreshed");
                self.state = GuardState::Active;
                self.emit(SessionEvent::Extended);
                Ok(())
            }
            Ok(RevalidationOutcome::Rejected) => {
                warn!("Revalidation rejected; ending session");
                self.logout(LogoutCause::RevalidationRejected, now).await
            }
            Err(e) => {
                warn!(error = %e, "Revalidation call failed; ending session");
                self.logout(LogoutCause::RevalidationRejected, now).await
            }
        }
    }

    /// The inactivity timer fired.
    ///
    /// The runner is the timing authority: reaching this method means the
    /// full timeout elapsed without activity, so the session ends without
    /// re-deriving idleness from wall-clock reads.
    pub async fn on_inactivity_timeout(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_terminal() {
            return Ok(());
        }
        let Some(session) = self.store.get().await else {
            return Ok(());
        };
        let idle_seconds = session.idle_seconds(now) as u64;
        warn!(idle_seconds, "Inactivity timeout reached; ending session");
        self.end_session(LogoutCause::Inactivity, now).await?;
        self.emit(SessionEvent::IdleTimeout { idle_seconds });
        Ok(())
    }

    /// Force the session to end.
    ///
    /// Idempotent: ending an already-ended session is a no-op and emits
    /// nothing.
    pub async fn logout(&mut self, cause: LogoutCause, now: DateTime<Utc>) -> AppResult<()> {
        if self.is_terminal() {
            return Ok(());
        }
        match cause {
            LogoutCause::Inactivity => self.on_inactivity_timeout(now).await,
            LogoutCause::Manual => {
                self.end_session(cause, now).await?;
                self.emit(SessionEvent::Destroyed {
                    reason: "User logged out".to_string(),
                });
                Ok(())
            }
            LogoutCause::TokenExpired | LogoutCause::RevalidationRejected => {
                self.end_session(cause, now).await?;
                self.emit(SessionEvent::Expired);
                Ok(())
            }
        }
    }

    async fn end_session(&mut self, cause: LogoutCause, _now: DateTime<Utc>) -> AppResult<()> {
        info!(?cause, "Session ended");
        self.store.clear().await?;
        self.state = GuardState::LoggedOut;
        self.epoch += 1;
        Ok(())
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}
