//! Document request / enrollment record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use regidesk_core::traits::Versioned;
use regidesk_core::types::{RequestId, UserId};

use crate::user::UserRole;

use super::document_type::DocumentType;
use super::status::RequestStatus;

/// A document request or enrollment record.
///
/// Created when a user submits a request; mutated only through the
/// transition engine; never deleted by this core. The `form_data` payload
/// is opaque — student details, pickup preferences, and uploaded file
/// references pass through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Unique record identifier.
    pub id: RequestId,
    /// The user who submitted the request.
    pub requester: UserId,
    /// What is being requested.
    pub document_type: DocumentType,
    /// Current pipeline status.
    pub status: RequestStatus,
    /// Opaque submitted form payload.
    pub form_data: serde_json::Value,
    /// Reason supplied when the request was rejected.
    pub rejection_reason: Option<String>,

    // -- Per-destination-state stamps --
    /// When the request was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// When the request was rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// When the appointment stub was issued.
    pub stub_generated_at: Option<DateTime<Utc>>,
    /// When the document became ready for pickup.
    pub ready_at: Option<DateTime<Utc>>,
    /// When the request was fulfilled.
    pub completed_at: Option<DateTime<Utc>>,

    /// Role-stamped transition history, oldest first.
    pub history: Vec<TransitionEntry>,
    /// Optimistic concurrency version, bumped by the store on update.
    pub version: i64,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// One entry in a record's transition history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEntry {
    /// Status before the transition.
    pub from: RequestStatus,
    /// Status after the transition.
    pub to: RequestStatus,
    /// Role of the actor who made the change.
    pub actor_role: UserRole,
    /// When the transition happened.
    pub at: DateTime<Utc>,
}

impl RequestRecord {
    /// Create a fresh record in the `pending` state.
    pub fn new(
        requester: UserId,
        document_type: DocumentType,
        form_data: serde_json::Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            requester,
            document_type,
            status: RequestStatus::Pending,
            form_data,
            rejection_reason: None,
            approved_at: None,
            rejected_at: None,
            stub_generated_at: None,
            ready_at: None,
            completed_at: None,
            history: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The stamp recorded when this record entered `status`, if any.
    pub fn stamp_for(&self, status: RequestStatus) -> Option<DateTime<Utc>> {
        match status {
            RequestStatus::Approved => self.approved_at,
            RequestStatus::Rejected => self.rejected_at,
            RequestStatus::StubGenerated => self.stub_generated_at,
            RequestStatus::Ready => self.ready_at,
            RequestStatus::Completed => self.completed_at,
            RequestStatus::Pending => Some(self.created_at),
        }
    }

    /// Set the stamp for the given destination state.
    pub fn set_stamp(&mut self, status: RequestStatus, at: DateTime<Utc>) {
        match status {
            RequestStatus::Approved => self.approved_at = Some(at),
            RequestStatus::Rejected => self.rejected_at = Some(at),
            RequestStatus::StubGenerated => self.stub_generated_at = Some(at),
            RequestStatus::Ready => self.ready_at = Some(at),
            RequestStatus::Completed => self.completed_at = Some(at),
            // Records are only ever created in pending; nothing to stamp.
            RequestStatus::Pending => {}
        }
    }
}

impl Versioned for RequestRecord {
    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}
