//! Expected reasons a transition attempt is refused.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use regidesk_core::error::AppError;
use regidesk_entity::request::{DocumentType, RequestStatus};
use regidesk_entity::user::UserRole;

/// Why a transition attempt was refused.
///
/// These are expected domain outcomes, not failures: the engine returns
/// them as the `Err` arm of a plain `Result` and callers inspect them.
/// Mapping into [`AppError`] happens only at the application boundary.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum TransitionRejection {
    /// The actor's role is below the required role.
    #[error("transition requires role {required}, actor has {actual}")]
    InsufficientRole {
        /// The role the pipeline requires.
        required: UserRole,
        /// The role the actor holds.
        actual: UserRole,
    },
    /// The (status, proposed) pair is not in the document type's table.
    #[error("illegal transition {from} -> {to} for {document_type}")]
    IllegalTransition {
        /// The record's document type.
        document_type: DocumentType,
        /// Status before the attempt.
        from: RequestStatus,
        /// The proposed destination status.
        to: RequestStatus,
    },
    /// A rejection was proposed without a non-empty reason.
    #[error("rejection requires a non-empty reason")]
    MissingReason,
    /// The record is already in the proposed status.
    #[error("record is already {status}")]
    NoOp {
        /// The status the record already holds.
        status: RequestStatus,
    },
    /// The record changed under the caller; reload and retry.
    #[error("record was modified concurrently")]
    StaleRecord,
}

impl From<TransitionRejection> for AppError {
    fn from(rejection: TransitionRejection) -> Self {
        match &rejection {
            TransitionRejection::InsufficientRole { .. } => {
                AppError::authorization(rejection.to_string())
            }
            TransitionRejection::StaleRecord => AppError::conflict(rejection.to_string()),
            TransitionRejection::IllegalTransition { .. }
            | TransitionRejection::MissingReason
            | TransitionRejection::NoOp { .. } => AppError::validation(rejection.to_string()),
        }
    }
}
