//! The status transition engine.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use regidesk_entity::request::{RequestRecord, RequestStatus, TransitionEntry};
use regidesk_entity::user::UserRole;

use crate::TRANSITION_REQUIRED_ROLE;
use crate::rejection::TransitionRejection;
use crate::tables;

/// Applies role-gated, table-checked status transitions to records.
///
/// Stateless: every call takes the full prior record and returns a full
/// new record. The caller persists the result; the optimistic-concurrency
/// version is bumped by the record store on write, never here.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusTransitionEngine;

impl StatusTransitionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Attempt to move `record` to `proposed`.
    ///
    /// Checks run in a fixed order: actor role, no-op, transition table,
    /// rejection reason. On success the returned record carries the new
    /// status, a destination-state timestamp, an appended history entry,
    /// and a fresh `updated_at`. The input record is never mutated, so a
    /// refusal leaves no partial update behind.
    pub fn attempt_transition(
        &self,
        record: &RequestRecord,
        proposed: RequestStatus,
        actor_role: UserRole,
        rejection_reason: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<RequestRecord, TransitionRejection> {
        if !actor_role.has_at_least(&TRANSITION_REQUIRED_ROLE) {
            return Err(TransitionRejection::InsufficientRole {
                required: TRANSITION_REQUIRED_ROLE,
                actual: actor_role,
            });
        }

        if record.status == proposed {
            debug!(record_id = %record.id, status = %proposed, "Transition is a no-op");
            return Err(TransitionRejection::NoOp {
                status: record.status,
            });
        }

        let family = record.document_type.family();
        if !tables::is_allowed(family, record.status, proposed) {
            return Err(TransitionRejection::IllegalTransition {
                document_type: record.document_type,
                from: record.status,
                to: proposed,
            });
        }

        let reason = rejection_reason.map(str::trim).filter(|r| !r.is_empty());
        if proposed == RequestStatus::Rejected && reason.is_none() {
            return Err(TransitionRejection::MissingReason);
        }

        let mut updated = record.clone();
        let from = updated.status;
        updated.status = proposed;
        updated.set_stamp(proposed, now);
        if proposed == RequestStatus::Rejected {
            updated.rejection_reason = reason.map(str::to_string);
        }
        updated.history.push(TransitionEntry {
            from,
            to: proposed,
            actor_role,
            at: now,
        });
        updated.updated_at = now;

        info!(
            record_id = %updated.id,
            document_type = %updated.document_type,
            %from,
            to = %proposed,
            actor_role = %actor_role,
            "Status transition applied"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regidesk_core::types::UserId;
    use regidesk_entity::request::DocumentType;

    fn record(document_type: DocumentType, status: RequestStatus) -> RequestRecord {
        let mut record = RequestRecord::new(
            UserId::new(),
            document_type,
            serde_json::json!({"studentName": "Maria Santos"}),
            Utc::now(),
        );
        record.status = status;
        record
    }

    fn engine() -> StatusTransitionEngine {
        StatusTransitionEngine::new()
    }

    #[test]
    fn test_approve_pending_request() {
        let now = Utc::now();
        let record = record(DocumentType::Form138, RequestStatus::Pending);

        let updated = engine()
            .attempt_transition(&record, RequestStatus::Approved, UserRole::Admin, None, now)
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Approved);
        assert_eq!(updated.approved_at, Some(now));
        assert_eq!(updated.updated_at, now);
        assert_eq!(updated.history.len(), 1);
        assert_eq!(updated.history[0].from, RequestStatus::Pending);
        assert_eq!(updated.history[0].to, RequestStatus::Approved);
        assert_eq!(updated.history[0].actor_role, UserRole::Admin);
    }

    #[test]
    fn test_stub_family_cannot_skip_to_completed() {
        let record = record(DocumentType::Form137, RequestStatus::Pending);

        let rejection = engine()
            .attempt_transition(
                &record,
                RequestStatus::Completed,
                UserRole::Admin,
                None,
                Utc::now(),
            )
            .unwrap_err();

        assert_eq!(
            rejection,
            TransitionRejection::IllegalTransition {
                document_type: DocumentType::Form137,
                from: RequestStatus::Pending,
                to: RequestStatus::Completed,
            }
        );
    }

    #[test]
    fn test_direct_family_approved_to_ready_stamps_ready_at() {
        let now = Utc::now();
        let record = record(DocumentType::Form138, RequestStatus::Approved);

        let updated = engine()
            .attempt_transition(&record, RequestStatus::Ready, UserRole::Admin, None, now)
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Ready);
        assert_eq!(updated.ready_at, Some(now));
    }

    #[test]
    fn test_stub_family_full_pipeline() {
        let engine = engine();
        let now = Utc::now();
        let record = record(DocumentType::Form137, RequestStatus::Pending);

        let approved = engine
            .attempt_transition(&record, RequestStatus::Approved, UserRole::Admin, None, now)
            .unwrap();
        let stubbed = engine
            .attempt_transition(
                &approved,
                RequestStatus::StubGenerated,
                UserRole::Admin,
                None,
                now,
            )
            .unwrap();
        let completed = engine
            .attempt_transition(
                &stubbed,
                RequestStatus::Completed,
                UserRole::Admin,
                None,
                now,
            )
            .unwrap();

        assert_eq!(completed.status, RequestStatus::Completed);
        assert_eq!(completed.stub_generated_at, Some(now));
        assert_eq!(completed.completed_at, Some(now));
        assert_eq!(completed.history.len(), 3);
    }

    #[test]
    fn test_regular_user_cannot_transition() {
        let record = record(DocumentType::Form138, RequestStatus::Pending);

        let rejection = engine()
            .attempt_transition(
                &record,
                RequestStatus::Approved,
                UserRole::User,
                None,
                Utc::now(),
            )
            .unwrap_err();

        assert_eq!(
            rejection,
            TransitionRejection::InsufficientRole {
                required: UserRole::Admin,
                actual: UserRole::User,
            }
        );
    }

    #[test]
    fn test_reapplying_status_is_noop_and_never_restamps() {
        let engine = engine();
        let first = Utc::now();
        let record = record(DocumentType::Form138, RequestStatus::Pending);

        let approved = engine
            .attempt_transition(&record, RequestStatus::Approved, UserRole::Admin, None, first)
            .unwrap();

        let later = first + chrono::Duration::minutes(5);
        let rejection = engine
            .attempt_transition(&approved, RequestStatus::Approved, UserRole::Admin, None, later)
            .unwrap_err();

        assert_eq!(
            rejection,
            TransitionRejection::NoOp {
                status: RequestStatus::Approved,
            }
        );
        // The original stamp survives untouched.
        assert_eq!(approved.approved_at, Some(first));
        assert_eq!(approved.history.len(), 1);
    }

    #[test]
    fn test_rejection_requires_reason() {
        let record = record(DocumentType::Form137, RequestStatus::Pending);

        for reason in [None, Some(""), Some("   ")] {
            let rejection = engine()
                .attempt_transition(
                    &record,
                    RequestStatus::Rejected,
                    UserRole::Admin,
                    reason,
                    Utc::now(),
                )
                .unwrap_err();
            assert_eq!(rejection, TransitionRejection::MissingReason);
        }
        assert_eq!(record.status, RequestStatus::Pending);
        assert!(record.rejection_reason.is_none());
    }

    #[test]
    fn test_rejection_with_reason_stamps_and_records_reason() {
        let now = Utc::now();
        let record = record(DocumentType::GoodMoral, RequestStatus::Pending);

        let updated = engine()
            .attempt_transition(
                &record,
                RequestStatus::Rejected,
                UserRole::Admin,
                Some("Incomplete requirements"),
                now,
            )
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Rejected);
        assert_eq!(updated.rejected_at, Some(now));
        assert_eq!(
            updated.rejection_reason.as_deref(),
            Some("Incomplete requirements")
        );
    }

    #[test]
    fn test_every_unlisted_pair_is_rejected() {
        let engine = engine();
        let now = Utc::now();

        for document_type in [
            DocumentType::Form137,
            DocumentType::Form138,
            DocumentType::GoodMoral,
            DocumentType::Enrollment,
        ] {
            let family = document_type.family();
            for from in RequestStatus::all() {
                for to in RequestStatus::all() {
                    let record = record(document_type, from);
                    let reason = (to == RequestStatus::Rejected).then_some("reason");
                    let result = engine.attempt_transition(
                        &record,
                        to,
                        UserRole::Admin,
                        reason,
                        now,
                    );
                    if crate::tables::is_allowed(family, from, to) {
                        assert!(result.is_ok(), "{document_type}: {from} -> {to}");
                    } else {
                        assert!(result.is_err(), "{document_type}: {from} -> {to}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_version_is_left_for_the_store_to_bump() {
        let record = record(DocumentType::Enrollment, RequestStatus::Pending);
        let updated = engine()
            .attempt_transition(
                &record,
                RequestStatus::Approved,
                UserRole::Admin,
                None,
                Utc::now(),
            )
            .unwrap();
        assert_eq!(updated.version, record.version);
    }
}
