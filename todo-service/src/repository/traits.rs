//! Storage adapter trait
//!
//! Uses RPITIT (Return Position Impl Trait In Traits) so implementations can
//! be written with plain `async fn` and no `async_trait`.

use std::future::Future;

use super::error::RepositoryError;
use crate::pagination::{Page, PageRequest};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Storage adapter for one entity type
///
/// The adapter is the only stateful, I/O-bound component underneath the
/// services. It never assigns identifiers or timestamps; it stores what it
/// is given and hands it back unchanged.
///
/// # Type Parameters
///
/// - `Id`: The identifier type for the entity (e.g., `TodoId`)
/// - `Entity`: The stored entity type
///
/// # Example
///
/// ```rust,ignore
/// use todo_service::repository::{Repository, RepositoryResult};
///
/// impl Repository<TodoId, Todo> for MyStore {
///     async fn find_by_id(&self, id: &TodoId) -> RepositoryResult<Option<Todo>> {
///         Ok(self.rows.read().await.get(id).cloned())
///     }
///     // ... other methods
/// }
/// ```
pub trait Repository<Id, Entity>: Send + Sync {
    /// Insert the entity if no record exists for its id, otherwise replace it
    ///
    /// Returns the stored value.
    ///
    /// # Errors
    ///
    /// An entity without an identifier is rejected with a
    /// `ValidationFailed` error.
    fn save(&self, entity: Entity) -> impl Future<Output = RepositoryResult<Entity>> + Send;

    /// Find an entity by its unique identifier
    ///
    /// Returns `Ok(Some(entity))` if found, `Ok(None)` if not found.
    fn find_by_id(&self, id: &Id) -> impl Future<Output = RepositoryResult<Option<Entity>>> + Send;

    /// Every stored entity, ordered by identifier
    ///
    /// Identifiers are time-ordered, so this is creation order.
    fn find_all(&self) -> impl Future<Output = RepositoryResult<Vec<Entity>>> + Send;

    /// One page of entities
    ///
    /// Unsorted requests use identifier order. Unknown sort fields fall back
    /// to identifier order as well.
    fn find_page(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = RepositoryResult<Page<Entity>>> + Send;

    /// Number of stored entities
    fn count(&self) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Check if an entity exists by its identifier
    fn exists_by_id(&self, id: &Id) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Remove an entity by its identifier
    ///
    /// Returns `true` if the entity was deleted, `false` if it didn't exist.
    fn delete_by_id(&self, id: &Id) -> impl Future<Output = RepositoryResult<bool>> + Send;
}
