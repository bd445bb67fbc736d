//! # regidesk-auth
//!
//! Credential interpretation, session lifecycle management, and access
//! gating for the Regidesk portal.
//!
//! ## Modules
//!
//! - `token` — fail-closed expiry classification of bearer credentials
//! - `session` — persisted session store, lifecycle guard, and the async
//!   runner driving the expiry poll and inactivity timer
//! - `access` — role-based allow/deny decisions for protected operations

pub mod access;
pub mod session;
pub mod token;

pub use access::{AccessDecision, AccessGate};
pub use session::{
    GuardHandle, GuardRunner, GuardState, LocalRevalidator, LogoutCause, SessionGuard,
    SessionStore, SessionView,
};
pub use token::{TokenClock, TokenState};
