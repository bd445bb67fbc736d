//! Credential expiry interpretation.

pub mod clock;

pub use clock::{TokenClock, TokenState};
