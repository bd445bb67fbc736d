//! Enrollment status lookup.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::error;

use regidesk_core::result::AppResult;
use regidesk_core::types::UserId;
use regidesk_entity::request::{DocumentType, RequestRecord, RequestStatus};
use regidesk_storage::RequestRecordStore;

/// Where enrollment records are looked up.
#[async_trait]
pub trait EnrollmentSource: Send + Sync + 'static {
    /// The student's most recent enrollment record, if any.
    async fn latest_enrollment(&self, student: UserId) -> AppResult<Option<RequestRecord>>;
}

#[async_trait]
impl EnrollmentSource for RequestRecordStore {
    async fn latest_enrollment(&self, student: UserId) -> AppResult<Option<RequestRecord>> {
        Ok(self.find_latest_of_type(student, DocumentType::Enrollment))
    }
}

/// Result of an enrollment check.
///
/// A failed lookup is reported as its own variant rather than being
/// folded into "not enrolled", so a backend outage never masquerades as a
/// student who simply hasn't enrolled.
#[derive(Debug, Clone, PartialEq)]
pub enum EnrollmentCheck {
    /// An approved (or fulfilled) enrollment exists.
    Enrolled {
        /// When the enrollment was approved.
        since: Option<DateTime<Utc>>,
    },
    /// An enrollment application exists but hasn't been decided yet.
    Pending,
    /// No enrollment record exists, or the latest one was rejected.
    NotEnrolled,
    /// The lookup itself failed.
    CheckFailed {
        /// What went wrong.
        message: String,
    },
}

/// Checks a student's enrollment standing.
pub struct EnrollmentLookup<S: EnrollmentSource> {
    source: Arc<S>,
}

impl<S: EnrollmentSource> EnrollmentLookup<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Check the student's current enrollment standing. Never returns an
    /// error: lookup failures surface as [`EnrollmentCheck::CheckFailed`].
    pub async fn check(&self, student: UserId) -> EnrollmentCheck {
        let record = match self.source.latest_enrollment(student).await {
            Ok(record) => record,
            Err(e) => {
                error!(%student, error = %e, "Enrollment lookup failed");
                return EnrollmentCheck::CheckFailed {
                    message: e.to_string(),
                };
            }
        };

        match record {
            Some(record) => match record.status {
                RequestStatus::Approved | RequestStatus::Completed => EnrollmentCheck::Enrolled {
                    since: record.approved_at,
                },
                RequestStatus::Pending => EnrollmentCheck::Pending,
                RequestStatus::Rejected => EnrollmentCheck::NotEnrolled,
                // Enrollment is a direct-fulfillment type; these states do
                // not occur for it, but an unexpected status must not read
                // as enrolled.
                RequestStatus::StubGenerated | RequestStatus::Ready => {
                    EnrollmentCheck::NotEnrolled
                }
            },
            None => EnrollmentCheck::NotEnrolled,
        }
    }
}
