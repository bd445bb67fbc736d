//! Trait seams between the session/workflow core and its collaborators.

pub mod repository;
pub mod revalidate;
pub mod storage;

pub use repository::{Versioned, VersionedRepository};
pub use revalidate::{RevalidationOutcome, SessionRevalidator};
pub use storage::SessionBackend;
