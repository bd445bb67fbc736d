//! Session-related domain events.
//!
//! Emitted by the session guard on its broadcast channel so that display
//! components (warning dialog, countdown, login prompt) can react without
//! holding a writer handle to the session state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to the client session lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A user logged in and a session was created.
    Created {
        /// The user ID.
        user_id: Uuid,
    },
    /// A persisted session from a previous run was adopted at startup.
    Restored {
        /// The user ID.
        user_id: Uuid,
    },
    /// The credential enters its expiry warning window.
    WarningShown {
        /// Seconds remaining until the credential expires.
        seconds_left: u64,
    },
    /// The user extended the session; the warning is dismissed.
    Extended,
    /// The credential expired (or revalidation failed) and the session
    /// was cleared.
    Expired,
    /// The session was cleared after the inactivity timeout fired.
    IdleTimeout {
        /// How long the session had been idle, in seconds.
        idle_seconds: u64,
    },
    /// The session ended for any other reason (explicit logout).
    Destroyed {
        /// Why the session ended.
        reason: String,
    },
}
