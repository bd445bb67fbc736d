//! Session lifecycle management: persisted store, guard state machine,
//! and the async runner driving its timers.

pub mod guard;
pub mod revalidate;
pub mod runner;
pub mod store;

pub use guard::{GuardEvent, GuardState, LogoutCause, SessionGuard};
pub use revalidate::LocalRevalidator;
pub use runner::{GuardHandle, GuardRunner};
pub use store::{SessionStore, SessionView};
