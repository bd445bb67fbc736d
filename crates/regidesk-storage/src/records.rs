//! In-memory versioned store for request/enrollment records.
//!
//! The persistence layer proper is an external collaborator; this store
//! exists so the workflow pipeline has something real to serialize
//! concurrent transition attempts against. Same-record writers race on a
//! version compare: the second writer loses with a conflict instead of
//! silently overwriting the first.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use regidesk_core::error::AppError;
use regidesk_core::result::AppResult;
use regidesk_core::traits::{Versioned, VersionedRepository};
use regidesk_core::types::{RequestId, UserId};
use regidesk_entity::request::{DocumentType, RequestRecord};

/// Concurrent in-memory record store with optimistic versioning.
#[derive(Debug, Default)]
pub struct RequestRecordStore {
    records: DashMap<RequestId, RequestRecord>,
}

impl RequestRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records submitted by the given user, unordered.
    pub fn find_by_requester(&self, requester: UserId) -> Vec<RequestRecord> {
        self.records
            .iter()
            .filter(|entry| entry.value().requester == requester)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// The most recently created record of `document_type` for the user.
    pub fn find_latest_of_type(
        &self,
        requester: UserId,
        document_type: DocumentType,
    ) -> Option<RequestRecord> {
        self.records
            .iter()
            .filter(|entry| {
                let r = entry.value();
                r.requester == requester && r.document_type == document_type
            })
            .map(|entry| entry.value().clone())
            .max_by_key(|r| r.created_at)
    }
}

#[async_trait]
impl VersionedRepository<RequestRecord, RequestId> for RequestRecordStore {
    async fn find_by_id(&self, id: &RequestId) -> AppResult<Option<RequestRecord>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn insert(&self, entity: &RequestRecord) -> AppResult<RequestRecord> {
        use dashmap::mapref::entry::Entry;

        match self.records.entry(entity.id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Record {} already exists",
                entity.id
            ))),
            Entry::Vacant(slot) => {
                let mut stored = entity.clone();
                stored.set_version(1);
                slot.insert(stored.clone());
                debug!(request_id = %stored.id, "Record inserted");
                Ok(stored)
            }
        }
    }

    async fn compare_and_update(&self, entity: &RequestRecord) -> AppResult<RequestRecord> {
        let mut stored = self
            .records
            .get_mut(&entity.id)
            .ok_or_else(|| AppError::not_found(format!("Record {} not found", entity.id)))?;

        if stored.version() != entity.version() {
            return Err(AppError::conflict(format!(
                "Stale record {}: expected version {}, found {}",
                entity.id,
                entity.version(),
                stored.version()
            )));
        }

        let mut updated = entity.clone();
        updated.set_version(entity.version() + 1);
        *stored = updated.clone();
        debug!(
            request_id = %updated.id,
            version = updated.version(),
            "Record updated"
        );
        Ok(updated)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.records.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use regidesk_core::error::ErrorKind;
    use regidesk_entity::request::RequestStatus;

    fn sample_record() -> RequestRecord {
        RequestRecord::new(
            UserId::new(),
            DocumentType::Form138,
            serde_json::json!({ "purpose": "transfer" }),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = RequestRecordStore::new();
        let record = store.insert(&sample_record()).await.unwrap();
        assert_eq!(record.version, 1);

        let found = store.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(found.status, RequestStatus::Pending);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_conflicts() {
        let store = RequestRecordStore::new();
        let record = store.insert(&sample_record()).await.unwrap();
        let err = store.insert(&record).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_second_writer_loses() {
        let store = RequestRecordStore::new();
        let stored = store.insert(&sample_record()).await.unwrap();

        // Two actors read the same version and both try to update.
        let mut first = stored.clone();
        first.status = RequestStatus::Approved;
        let mut second = stored.clone();
        second.status = RequestStatus::Rejected;

        let first = store.compare_and_update(&first).await.unwrap();
        assert_eq!(first.version, 2);

        let err = store.compare_and_update(&second).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        // The first write is what remains.
        let current = store.find_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(current.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_find_latest_of_type() {
        let store = RequestRecordStore::new();
        let user = UserId::new();

        let mut older = RequestRecord::new(
            user,
            DocumentType::Enrollment,
            serde_json::json!({}),
            Utc::now() - chrono::Duration::days(1),
        );
        older.id = RequestId::new();
        store.insert(&older).await.unwrap();

        let newer =
            RequestRecord::new(user, DocumentType::Enrollment, serde_json::json!({}), Utc::now());
        store.insert(&newer).await.unwrap();

        let latest = store.find_latest_of_type(user, DocumentType::Enrollment).unwrap();
        assert_eq!(latest.id, newer.id);
        assert!(store.find_latest_of_type(user, DocumentType::Form137).is_none());
    }
}
