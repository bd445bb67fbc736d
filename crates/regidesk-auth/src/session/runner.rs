//! Session runner — async loop that drives the guard's timers.
//!
//! The runner owns the [`SessionGuard`] and supplies everything temporal:
//! the periodic credential poll, the inactivity deadline, and the spawn of
//! revalidation tasks. User-facing components talk to it through a
//! [`GuardHandle`]. The loop exits once the guard reaches its terminal
//! state or the shutdown signal fires; exiting drops both timers, so no
//! further transition can occur afterwards.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use regidesk_core::config::session::SessionConfig;
use regidesk_core::error::AppError;
use regidesk_core::events::SessionEvent;
use regidesk_core::result::AppResult;
use regidesk_core::traits::SessionRevalidator;

use super::guard::{GuardEvent, GuardState, LogoutCause, SessionGuard};

/// Capacity of the runner's command mailbox.
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Cloneable handle for driving a running session loop.
#[derive(Clone)]
pub struct GuardHandle {
    tx: mpsc::Sender<GuardEvent>,
    events: broadcast::Sender<SessionEvent>,
}

impl GuardHandle {
    /// Report user activity, resetting the inactivity clock.
    pub async fn activity(&self) -> AppResult<()> {
        self.send(GuardEvent::Activity).await
    }

    /// Ask to extend the expiring session.
    pub async fn extend(&self) -> AppResult<()> {
        self.send(GuardEvent::ExtendRequested).await
    }

    /// Log out explicitly.
    pub async fn logout(&self) -> AppResult<()> {
        self.send(GuardEvent::LogoutRequested).await
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn send(&self, event: GuardEvent) -> AppResult<()> {
        self.tx
            .send(event)
            .await
            .map_err(|_| AppError::session("Session runner is not running"))
    }
}

impl std::fmt::Debug for GuardHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardHandle").finish_non_exhaustive()
    }
}

/// Async loop driving a [`SessionGuard`].
pub struct GuardRunner {
    guard: SessionGuard,
    revalidator: Arc<dyn SessionRevalidator>,
    poll_interval: Duration,
    inactivity_timeout: Duration,
    rx: mpsc::Receiver<GuardEvent>,
    /// Internal sender kept so spawned revalidation tasks can report back.
    tx: mpsc::Sender<GuardEvent>,
}

impl GuardRunner {
    /// Create a runner over `guard`. Returns the runner and the handle
    /// used to drive it.
    pub fn new(
        guard: SessionGuard,
        revalidator: Arc<dyn SessionRevalidator>,
        config: &SessionConfig,
    ) -> (Self, GuardHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let handle = GuardHandle {
            tx: tx.clone(),
            events: guard.event_sender(),
        };
        let runner = Self {
            guard,
            revalidator,
            poll_interval: Duration::from_secs(config.token_poll_interval_seconds),
            inactivity_timeout: Duration::from_secs(config.inactivity_timeout_minutes * 60),
            rx,
            tx,
        };
        (runner, handle)
    }

    /// Run until the guard reaches its terminal state or `shutdown` fires.
    ///
    /// Returns the guard so a caller can inspect its final state or log
    /// the same user back in with a fresh runner.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SessionGuard {
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            inactivity_timeout_secs = self.inactivity_timeout.as_secs(),
            "Session runner started"
        );

        let mut poll = time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval fires immediately; consuming
        // it here keeps the poll cadence strictly periodic after startup.
        poll.tick().await;

        let idle_deadline = time::sleep(self.inactivity_timeout);
        tokio::pin!(idle_deadline);

        loop {
            if self.guard.is_terminal() {
                debug!("Guard reached terminal state; stopping runner");
                break;
            }

            // While the warning dialog is up, the countdown doubles as a
            // deadline: reaching zero must not wait for the next poll.
            let countdown_secs = match self.guard.state() {
                GuardState::Warning { seconds_left } => Some(seconds_left),
                _ => None,
            };

            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Session runner received shutdown signal");
                        break;
                    }
                }
                event = self.rx.recv() => {
                    match event {
                        Some(event) => {
                            let reset_idle = matches!(event, GuardEvent::Activity);
                            self.handle_event(event).await;
                            if reset_idle {
                                idle_deadline
                                    .as_mut()
                                    .reset(time::Instant::now() + self.inactivity_timeout);
                            }
                        }
                        // All handles dropped; nothing can drive us anymore.
                        None => break,
                    }
                }
                _ = poll.tick() => {
                    if let Err(e) = self.guard.on_tick(Utc::now()).await {
                        error!(error = %e, "Credential expiry check failed");
                    }
                }
                _ = &mut idle_deadline => {
                    if let Err(e) = self.guard.on_inactivity_timeout(Utc::now()).await {
                        error!(error = %e, "Inactivity logout failed");
                    }
                    // Re-arm so an elapsed deadline is never polled again.
                    idle_deadline
                        .as_mut()
                        .reset(time::Instant::now() + self.inactivity_timeout);
                }
                _ = countdown_elapsed(countdown_secs) => {
                    if let Err(e) = self.guard.on_tick(Utc::now()).await {
                        error!(error = %e, "Expiry check at countdown zero failed");
                    }
                }
            }
        }

        info!("Session runner stopped");
        self.guard
    }

    async fn handle_event(&mut self, event: GuardEvent) {
        match event {
            GuardEvent::Activity => {
                if let Err(e) = self.guard.on_activity(Utc::now()).await {
                    error!(error = %e, "Failed to record user activity");
                }
            }
            GuardEvent::ExtendRequested => match self.guard.begin_extend().await {
                Ok(Some((epoch, token))) => self.spawn_revalidation(epoch, token),
                Ok(None) => {}
                Err(e) => error!(error = %e, "Failed to begin session extension"),
            },
            GuardEvent::LogoutRequested => {
                if let Err(e) = self.guard.logout(LogoutCause::Manual, Utc::now()).await {
                    error!(error = %e, "Failed to log out");
                }
            }
            GuardEvent::ExtendResolved { epoch, outcome } => {
                if let Err(e) = self
                    .guard
                    .on_extend_resolved(epoch, outcome, Utc::now())
                    .await
                {
                    error!(error = %e, "Failed to apply extension result");
                }
            }
        }
    }

    /// Revalidate off-loop so a slow backend never stalls the timers.
    fn spawn_revalidation(&self, epoch: u64, token: String) {
        let revalidator = Arc::clone(&self.revalidator);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            debug!(epoch, "Revalidation task started");
            let outcome = revalidator.revalidate(&token).await;
            // If the runner already stopped there is nobody to apply the
            // result to, which is exactly the intended behavior.
            let _ = tx.send(GuardEvent::ExtendResolved { epoch, outcome }).await;
        });
    }
}

/// Sleep out the warning countdown, or park forever when none is showing.
async fn countdown_elapsed(seconds_left: Option<u64>) {
    match seconds_left {
        Some(secs) => time::sleep(Duration::from_secs(secs)).await,
        None => std::future::pending().await,
    }
}

impl std::fmt::Debug for GuardRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardRunner")
            .field("poll_interval", &self.poll_interval)
            .field("inactivity_timeout", &self.inactivity_timeout)
            .finish_non_exhaustive()
    }
}
