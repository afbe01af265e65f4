//! In-memory storage adapter

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::Entity;
use crate::pagination::{sort_by_request, Page, PageRequest, SortableFields};
use crate::repository::{Repository, RepositoryError, RepositoryResult};

/// Process-local storage keyed by identifier
///
/// Records are kept in a `BTreeMap`, so listing returns identifier order,
/// which for time-ordered identifiers is creation order. Cloning the
/// repository shares the underlying map.
pub struct InMemoryRepository<E: Entity> {
    records: Arc<RwLock<BTreeMap<E::Id, E>>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> fmt::Debug for InMemoryRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("kind", &E::KIND)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<E> Repository<E::Id, E> for InMemoryRepository<E>
where
    E: Entity + SortableFields,
{
    async fn save(&self, entity: E) -> RepositoryResult<E> {
        let id = entity.id().cloned().ok_or_else(|| {
            RepositoryError::validation_failed(format!("{} has no identifier", E::KIND))
        })?;
        self.records.write().await.insert(id, entity.clone());
        Ok(entity)
    }

    async fn find_by_id(&self, id: &E::Id) -> RepositoryResult<Option<E>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<E>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn find_page(&self, request: &PageRequest) -> RepositoryResult<Page<E>> {
        let mut items: Vec<E> = self.records.read().await.values().cloned().collect();
        sort_by_request(&mut items, request.sort());
        Ok(Page::from_slice(&items, request))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }

    async fn exists_by_id(&self, id: &E::Id) -> RepositoryResult<bool> {
        Ok(self.records.read().await.contains_key(id))
    }

    async fn delete_by_id(&self, id: &E::Id) -> RepositoryResult<bool> {
        Ok(self.records.write().await.remove(id).is_some())
    }
}
