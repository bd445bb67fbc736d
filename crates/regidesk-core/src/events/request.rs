//! Request workflow domain events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events related to document request and enrollment records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestEvent {
    /// A user submitted a new request.
    Submitted {
        /// The record ID.
        request_id: Uuid,
        /// The submitting user.
        user_id: Uuid,
        /// The requested document type (wire form).
        document_type: String,
    },
    /// An administrator moved a record to a new status.
    StatusChanged {
        /// The record ID.
        request_id: Uuid,
        /// Previous status (wire form).
        from: String,
        /// New status (wire form).
        to: String,
        /// Role of the actor who made the change (wire form).
        actor_role: String,
    },
}
