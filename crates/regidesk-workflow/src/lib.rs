//! # regidesk-workflow
//!
//! The request-status state machine: per-document-type transition tables
//! and the engine that applies role-gated, timestamped status changes.
//!
//! The engine holds no state of its own. Every call receives the full
//! prior record and returns a full new record, so it is safe to call from
//! anywhere; serializing concurrent writes to the same record is the
//! record store's job.

pub mod engine;
pub mod rejection;
pub mod tables;

pub use engine::StatusTransitionEngine;
pub use rejection::TransitionRejection;

use regidesk_entity::user::UserRole;

/// The minimum role required to move a record through the pipeline.
///
/// This is the single definition consulted both by the access gate in
/// front of the engine and by the engine itself, so the two can never
/// disagree. Regular users only ever create records in `pending`.
pub const TRANSITION_REQUIRED_ROLE: UserRole = UserRole::Admin;
