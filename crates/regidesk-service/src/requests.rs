//! Request submission and status-change service.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use regidesk_auth::AccessGate;
use regidesk_core::error::{AppError, ErrorKind};
use regidesk_core::events::RequestEvent;
use regidesk_core::result::AppResult;
use regidesk_core::traits::VersionedRepository;
use regidesk_core::types::RequestId;
use regidesk_entity::request::{DocumentType, RequestRecord, RequestStatus};
use regidesk_entity::user::UserRole;
use regidesk_storage::RequestRecordStore;
use regidesk_workflow::{StatusTransitionEngine, TRANSITION_REQUIRED_ROLE, TransitionRejection};

/// The domain outcome of a transition attempt: the persisted record, or
/// the reason it was refused. Infrastructure failures travel in the outer
/// `AppResult`.
pub type TransitionOutcome = Result<RequestRecord, TransitionRejection>;

/// Submits requests and moves them through the status pipeline.
///
/// Every operation passes the access gate before anything else; the role
/// the gate requires for transitions is [`TRANSITION_REQUIRED_ROLE`], the
/// same constant the engine enforces, so the two can never drift apart.
#[derive(Clone)]
pub struct RequestService {
    gate: AccessGate,
    engine: StatusTransitionEngine,
    records: Arc<RequestRecordStore>,
    events: broadcast::Sender<RequestEvent>,
}

impl RequestService {
    pub fn new(gate: AccessGate, records: Arc<RequestRecordStore>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            gate,
            engine: StatusTransitionEngine::new(),
            records,
            events,
        }
    }

    /// Subscribe to request lifecycle events (submissions, status changes).
    pub fn subscribe(&self) -> broadcast::Receiver<RequestEvent> {
        self.events.subscribe()
    }

    /// Submit a new request. Any authenticated user may submit; the
    /// record starts in `pending`.
    pub async fn submit(
        &self,
        document_type: DocumentType,
        form_data: serde_json::Value,
    ) -> AppResult<RequestRecord> {
        let user = self.gate.require(UserRole::User).await?;
        let record = RequestRecord::new(user.id, document_type, form_data, Utc::now());
        let stored = self.records.insert(&record).await?;
        info!(
            request_id = %stored.id,
            %document_type,
            requester = %user.username,
            "Request submitted"
        );
        let _ = self.events.send(RequestEvent::Submitted {
            request_id: stored.id.into_uuid(),
            user_id: user.id.into_uuid(),
            document_type: document_type.as_str().to_string(),
        });
        Ok(stored)
    }

    /// The caller's own requests.
    pub async fn my_requests(&self) -> AppResult<Vec<RequestRecord>> {
        let user = self.gate.require(UserRole::User).await?;
        Ok(self.records.find_by_requester(user.id))
    }

    /// Load one record by id. Requires a live session.
    pub async fn get_request(&self, id: RequestId) -> AppResult<RequestRecord> {
        self.gate.require(UserRole::User).await?;
        self.records
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Request {id} not found")))
    }

    /// Move the record with `id` to `proposed`, loading the latest stored
    /// version first.
    pub async fn change_status(
        &self,
        id: RequestId,
        proposed: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> AppResult<TransitionOutcome> {
        let actor = match self.gate.check(TRANSITION_REQUIRED_ROLE).await {
            regidesk_auth::AccessDecision::Granted { user } => user,
            regidesk_auth::AccessDecision::NoSession => {
                return Err(AppError::authentication("No live session"));
            }
            regidesk_auth::AccessDecision::InsufficientRole { required, actual } => {
                warn!(%id, %proposed, %actual, "Status change denied before any record access");
                return Ok(Err(TransitionRejection::InsufficientRole {
                    required,
                    actual,
                }));
            }
        };

        let record = self
            .records
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Request {id} not found")))?;

        self.apply(&record, proposed, actor.role, rejection_reason)
            .await
    }

    /// Move a record snapshot the caller already holds to `proposed`.
    ///
    /// If the stored record moved on since the snapshot was taken, the
    /// version compare fails and the attempt comes back as
    /// [`TransitionRejection::StaleRecord`] — the second writer always
    /// loses, never silently overwrites.
    pub async fn change_status_from(
        &self,
        snapshot: &RequestRecord,
        proposed: RequestStatus,
        rejection_reason: Option<&str>,
    ) -> AppResult<TransitionOutcome> {
        let actor = match self.gate.check(TRANSITION_REQUIRED_ROLE).await {
            regidesk_auth::AccessDecision::Granted { user } => user,
            regidesk_auth::AccessDecision::NoSession => {
                return Err(AppError::authentication("No live session"));
            }
            regidesk_auth::AccessDecision::InsufficientRole { required, actual } => {
                return Ok(Err(TransitionRejection::InsufficientRole {
                    required,
                    actual,
                }));
            }
        };

        self.apply(snapshot, proposed, actor.role, rejection_reason)
            .await
    }

    async fn apply(
        &self,
        record: &RequestRecord,
        proposed: RequestStatus,
        actor_role: UserRole,
        rejection_reason: Option<&str>,
    ) -> AppResult<TransitionOutcome> {
        let updated =
            match self
                .engine
                .attempt_transition(record, proposed, actor_role, rejection_reason, Utc::now())
            {
                Ok(updated) => updated,
                Err(rejection) => return Ok(Err(rejection)),
            };

        match self.records.compare_and_update(&updated).await {
            Ok(stored) => {
                let _ = self.events.send(RequestEvent::StatusChanged {
                    request_id: stored.id.into_uuid(),
                    from: record.status.as_str().to_string(),
                    to: stored.status.as_str().to_string(),
                    actor_role: actor_role.as_str().to_string(),
                });
                Ok(Ok(stored))
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                warn!(request_id = %record.id, "Concurrent write lost the version race");
                Ok(Err(TransitionRejection::StaleRecord))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use regidesk_auth::SessionStore;
    use regidesk_core::types::UserId;
    use regidesk_entity::session::Session;
    use regidesk_entity::user::User;
    use regidesk_storage::MemorySessionBackend;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: UserId::new(),
            username: match role {
                UserRole::Admin => "registrar".into(),
                UserRole::User => "jdelacruz".into(),
            },
            display_name: "Test User".into(),
            role,
        }
    }

    async fn service_for(role: Option<UserRole>) -> (RequestService, Arc<RequestRecordStore>) {
        let store = SessionStore::new(Arc::new(MemorySessionBackend::new()));
        if let Some(role) = role {
            store
                .set(Session::new("a.b.c", user_with_role(role), Utc::now()))
                .await
                .unwrap();
        }
        let records = Arc::new(RequestRecordStore::new());
        let service = RequestService::new(AccessGate::new(store.view()), Arc::clone(&records));
        (service, records)
    }

    #[tokio::test]
    async fn test_submit_creates_pending_record() {
        let (service, records) = service_for(Some(UserRole::User)).await;

        let record = service
            .submit(DocumentType::Form138, serde_json::json!({"purpose": "transfer"}))
            .await
            .unwrap();

        assert_eq!(record.status, RequestStatus::Pending);
        assert_eq!(record.version, 1);
        assert_eq!(records.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_submit_without_session_is_refused() {
        let (service, records) = service_for(None).await;
        let err = service
            .submit(DocumentType::Form138, serde_json::json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(records.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_admin_approves_pending_request() {
        let (service, records) = service_for(Some(UserRole::Admin)).await;
        let record = records
            .insert(&RequestRecord::new(
                UserId::new(),
                DocumentType::Form137,
                serde_json::json!({}),
                Utc::now(),
            ))
            .await
            .unwrap();

        let approved = service
            .change_status(record.id, RequestStatus::Approved, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(approved.status, RequestStatus::Approved);
        assert_eq!(approved.version, 2);
        assert!(approved.approved_at.is_some());
    }

    #[tokio::test]
    async fn test_regular_user_denied_before_record_is_touched() {
        let (service, records) = service_for(Some(UserRole::User)).await;
        let record = records
            .insert(&RequestRecord::new(
                UserId::new(),
                DocumentType::Form138,
                serde_json::json!({}),
                Utc::now(),
            ))
            .await
            .unwrap();

        let outcome = service
            .change_status(record.id, RequestStatus::Approved, None)
            .await
            .unwrap();

        assert_eq!(
            outcome.unwrap_err(),
            TransitionRejection::InsufficientRole {
                required: UserRole::Admin,
                actual: UserRole::User,
            }
        );

        // The record never moved.
        let stored = records.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert_eq!(stored.version, 1);
        assert!(stored.history.is_empty());
    }

    #[tokio::test]
    async fn test_stale_snapshot_loses_the_race() {
        let (service, records) = service_for(Some(UserRole::Admin)).await;
        let record = records
            .insert(&RequestRecord::new(
                UserId::new(),
                DocumentType::Form138,
                serde_json::json!({}),
                Utc::now(),
            ))
            .await
            .unwrap();

        // One administrator approves from the snapshot.
        service
            .change_status_from(&record, RequestStatus::Approved, None)
            .await
            .unwrap()
            .unwrap();

        // A second administrator rejects from the same, now-stale snapshot.
        let outcome = service
            .change_status_from(&record, RequestStatus::Rejected, Some("Duplicate request"))
            .await
            .unwrap();

        assert_eq!(outcome.unwrap_err(), TransitionRejection::StaleRecord);
        let stored = records.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_illegal_transition_surfaces_engine_rejection() {
        let (service, records) = service_for(Some(UserRole::Admin)).await;
        let record = records
            .insert(&RequestRecord::new(
                UserId::new(),
                DocumentType::Form137,
                serde_json::json!({}),
                Utc::now(),
            ))
            .await
            .unwrap();

        let outcome = service
            .change_status(record.id, RequestStatus::Completed, None)
            .await
            .unwrap();

        assert!(matches!(
            outcome.unwrap_err(),
            TransitionRejection::IllegalTransition { .. }
        ));
    }

    #[tokio::test]
    async fn test_gate_and_engine_require_the_same_role() {
        // The service gates on the exact constant the engine enforces, so
        // a caller that passes the gate is never rejected by the engine on
        // role grounds.
        let (service, records) = service_for(Some(TRANSITION_REQUIRED_ROLE)).await;
        let record = records
            .insert(&RequestRecord::new(
                UserId::new(),
                DocumentType::GoodMoral,
                serde_json::json!({}),
                Utc::now(),
            ))
            .await
            .unwrap();

        let outcome = service
            .change_status(record.id, RequestStatus::Approved, None)
            .await
            .unwrap();
        assert!(outcome.is_ok());
    }

    #[tokio::test]
    async fn test_lifecycle_events_are_broadcast() {
        let (service, _records) = service_for(Some(UserRole::Admin)).await;
        let mut events = service.subscribe();

        let record = service
            .submit(DocumentType::Form138, serde_json::json!({}))
            .await
            .unwrap();
        service
            .change_status(record.id, RequestStatus::Approved, None)
            .await
            .unwrap()
            .unwrap();

        assert!(matches!(
            events.try_recv().unwrap(),
            RequestEvent::Submitted { .. }
        ));
        match events.try_recv().unwrap() {
            RequestEvent::StatusChanged { from, to, .. } => {
                assert_eq!(from, "pending");
                assert_eq!(to, "approved");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_my_requests_lists_only_own_records() {
        let store = SessionStore::new(Arc::new(MemorySessionBackend::new()));
        let me = user_with_role(UserRole::User);
        store
            .set(Session::new("a.b.c", me.clone(), Utc::now()))
            .await
            .unwrap();
        let records = Arc::new(RequestRecordStore::new());
        let service = RequestService::new(AccessGate::new(store.view()), Arc::clone(&records));

        records
            .insert(&RequestRecord::new(
                me.id,
                DocumentType::Form138,
                serde_json::json!({}),
                Utc::now(),
            ))
            .await
            .unwrap();
        records
            .insert(&RequestRecord::new(
                UserId::new(),
                DocumentType::Form138,
                serde_json::json!({}),
                Utc::now(),
            ))
            .await
            .unwrap();

        let mine = service.my_requests().await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].requester, me.id);
    }
}
