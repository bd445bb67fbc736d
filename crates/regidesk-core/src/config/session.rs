//! Session lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle configuration.
///
/// Controls the three timers that govern a live session: the inactivity
/// timeout, the expiry warning window, and the credential poll interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minutes without user activity before the session is force-logged-out.
    #[serde(default = "default_inactivity_timeout")]
    pub inactivity_timeout_minutes: u64,
    /// Seconds before credential expiry at which the warning dialog opens.
    #[serde(default = "default_warning_window")]
    pub warning_window_seconds: u64,
    /// Interval in seconds between credential expiry checks.
    #[serde(default = "default_poll_interval")]
    pub token_poll_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout_minutes: default_inactivity_timeout(),
            warning_window_seconds: default_warning_window(),
            token_poll_interval_seconds: default_poll_interval(),
        }
    }
}

fn default_inactivity_timeout() -> u64 {
    30
}

fn default_warning_window() -> u64 {
    300
}

fn default_poll_interval() -> u64 {
    60
}
