//! Runtime-selected todo storage

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::Todo;
use crate::error::Result;
use crate::ids::TodoId;
use crate::pagination::{Page, PageRequest};
use crate::repository::{Repository, RepositoryResult};

use super::InMemoryRepository;
#[cfg(feature = "database")]
use super::PgTodoRepository;

/// Todo storage chosen from configuration at startup
///
/// Dispatches every [`Repository`] call to the configured backend, so the
/// rest of the service is written against one concrete type.
#[derive(Debug, Clone)]
pub enum TodoStore {
    Memory(InMemoryRepository<Todo>),
    #[cfg(feature = "database")]
    Postgres(PgTodoRepository),
}

impl TodoStore {
    /// Empty process-local store
    pub fn memory() -> Self {
        Self::Memory(InMemoryRepository::new())
    }

    /// Open the backend named by the storage configuration
    ///
    /// The PostgreSQL backend connects with retries and creates its table
    /// if needed.
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::Memory => {
                tracing::info!(backend = %config.backend, "Using in-memory storage");
                Ok(Self::memory())
            }
            #[cfg(feature = "database")]
            StorageBackend::Postgres => {
                let repository = PgTodoRepository::connect(config).await?;
                repository.ensure_schema().await?;
                tracing::info!(backend = %config.backend, "Using PostgreSQL storage");
                Ok(Self::Postgres(repository))
            }
            #[cfg(not(feature = "database"))]
            StorageBackend::Postgres => Err(crate::error::Error::config(
                "storage.backend = \"postgres\" requires the `database` feature",
            )),
        }
    }

    /// Name of the active backend
    pub fn backend(&self) -> StorageBackend {
        match self {
            Self::Memory(_) => StorageBackend::Memory,
            #[cfg(feature = "database")]
            Self::Postgres(_) => StorageBackend::Postgres,
        }
    }

    /// Check that the backend can serve requests
    pub async fn ping(&self) -> RepositoryResult<()> {
        match self {
            Self::Memory(_) => Ok(()),
            #[cfg(feature = "database")]
            Self::Postgres(repo) => repo.ping().await,
        }
    }
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::memory()
    }
}

impl Repository<TodoId, Todo> for TodoStore {
    async fn save(&self, entity: Todo) -> RepositoryResult<Todo> {
        match self {
            Self::Memory(repo) => repo.save(entity).await,
            #[cfg(feature = "database")]
            Self::Postgres(repo) => repo.save(entity).await,
        }
    }

    async fn find_by_id(&self, id: &TodoId) -> RepositoryResult<Option<Todo>> {
        match self {
            Self::Memory(repo) => repo.find_by_id(id).await,
            #[cfg(feature = "database")]
            Self::Postgres(repo) => repo.find_by_id(id).await,
        }
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Todo>> {
        match self {
            Self::Memory(repo) => repo.find_all().await,
            #[cfg(feature = "database")]
            Self::Postgres(repo) => repo.find_all().await,
        }
    }

    async fn find_page(&self, request: &PageRequest) -> RepositoryResult<Page<Todo>> {
        match self {
            Self::Memory(repo) => repo.find_page(request).await,
            #[cfg(feature = "database")]
            Self::Postgres(repo) => repo.find_page(request).await,
        }
    }

    async fn count(&self) -> RepositoryResult<u64> {
        match self {
            Self::Memory(repo) => repo.count().await,
            #[cfg(feature = "database")]
            Self::Postgres(repo) => repo.count().await,
        }
    }

    async fn exists_by_id(&self, id: &TodoId) -> RepositoryResult<bool> {
        match self {
            Self::Memory(repo) => repo.exists_by_id(id).await,
            #[cfg(feature = "database")]
            Self::Postgres(repo) => repo.exists_by_id(id).await,
        }
    }

    async fn delete_by_id(&self, id: &TodoId) -> RepositoryResult<bool> {
        match self {
            Self::Memory(repo) => repo.delete_by_id(id).await,
            #[cfg(feature = "database")]
            Self::Postgres(repo) => repo.delete_by_id(id).await,
        }
    }
}
