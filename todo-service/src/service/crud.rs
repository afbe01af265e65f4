use std::future::Future;

use crate::pagination::{Page, PageRequest};
use crate::repository::RepositoryResult;

/// Entity-agnostic CRUD operations
///
/// Written once and reused for any entity/identifier pair. Operations that
/// target a single id (`update`, `delete`) fail with a `NotFound`
/// [`RepositoryError`](crate::repository::RepositoryError) when nothing is
/// stored under it; any other error is a storage fault passed through as-is.
///
/// # Type Parameters
///
/// - `E`: The entity type
/// - `I`: The identifier type
pub trait CrudService<E, I>: Send + Sync {
    /// Persist a new entity
    ///
    /// Assigns a fresh identifier and timestamps; whatever id the input
    /// carried is ignored.
    fn create(&self, entity: E) -> impl Future<Output = RepositoryResult<E>> + Send;

    /// Find an entity by its identifier
    fn find_by_id(&self, id: &I) -> impl Future<Output = RepositoryResult<Option<E>>> + Send;

    /// Every entity, in creation order
    fn find_all(&self) -> impl Future<Output = RepositoryResult<Vec<E>>> + Send;

    /// One page of entities
    fn find_page(&self, request: PageRequest)
        -> impl Future<Output = RepositoryResult<Page<E>>> + Send;

    /// Apply the user-editable fields of `changes` to the stored entity
    ///
    /// Identity, creation time and status fields are kept from the stored
    /// value.
    fn update(&self, id: &I, changes: E) -> impl Future<Output = RepositoryResult<E>> + Send;

    /// Remove the entity
    fn delete(&self, id: &I) -> impl Future<Output = RepositoryResult<()>> + Send;

    /// Whether an entity is stored under `id`
    fn exists(&self, id: &I) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Number of stored entities
    fn count(&self) -> impl Future<Output = RepositoryResult<u64>> + Send;
}
