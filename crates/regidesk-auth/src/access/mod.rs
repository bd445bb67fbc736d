//! Role-based access decisions.

pub mod gate;

pub use gate::{AccessDecision, AccessGate};
