//! Generic versioned repository trait for record persistence.

use async_trait::async_trait;

use crate::result::AppResult;

/// An entity carrying a monotonically increasing version counter.
///
/// The version is bumped by the repository on every successful update and
/// is the basis for optimistic concurrency control.
pub trait Versioned {
    /// Current version of the entity.
    fn version(&self) -> i64;

    /// Overwrite the version (repositories only).
    fn set_version(&mut self, version: i64);
}

/// Generic repository with compare-and-update semantics.
///
/// This trait is defined with generic type parameters so that each
/// entity can have a strongly typed repository. Entity-specific
/// query methods are defined on the concrete repository structs.
#[async_trait]
pub trait VersionedRepository<Entity, Id>: Send + Sync + 'static
where
    Entity: Versioned + Send + Sync + 'static,
    Id: Send + Sync + 'static,
{
    /// Find an entity by its primary key.
    async fn find_by_id(&self, id: &Id) -> AppResult<Option<Entity>>;

    /// Insert a new entity and return it as stored.
    async fn insert(&self, entity: &Entity) -> AppResult<Entity>;

    /// Update an entity only if its version matches the stored one.
    ///
    /// On a version mismatch the update is rejected with a
    /// [`crate::error::ErrorKind::Conflict`] error and the stored entity
    /// is left untouched; the caller must re-read and retry.
    async fn compare_and_update(&self, entity: &Entity) -> AppResult<Entity>;

    /// Count total entities.
    async fn count(&self) -> AppResult<u64>;
}
