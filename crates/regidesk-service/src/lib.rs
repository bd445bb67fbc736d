//! # regidesk-service
//!
//! Application services for the Regidesk portal. This crate wires the
//! pieces together: every protected operation passes the access gate
//! first, then the workflow engine, then the record store. A denied call
//! never touches a record.

pub mod enrollment;
pub mod requests;

pub use enrollment::{EnrollmentCheck, EnrollmentLookup, EnrollmentSource};
pub use requests::{RequestService, TransitionOutcome};
