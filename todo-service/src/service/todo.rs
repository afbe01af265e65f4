use crate::domain::{Entity, Todo};
use crate::ids::{IdGenerator, TodoId};
use crate::pagination::{Page, PageRequest};
use crate::repository::{Repository, RepositoryError, RepositoryOperation, RepositoryResult};

use super::crud::CrudService;
use super::locks::KeyedLocks;

fn not_found(id: &TodoId, operation: RepositoryOperation) -> RepositoryError {
    RepositoryError::not_found(Todo::KIND, id.as_str()).with_operation(operation)
}

/// Todo resource service
///
/// Implements [`CrudService`] for [`Todo`] over any storage adapter and adds
/// [`toggle_completion`](TodoService::toggle_completion).
///
/// `update`, `delete` and `toggle_completion` read, check and write under a
/// per-id lock, so concurrent calls on the same todo behave as if run one
/// after another. Calls on different todos never wait on each other.
///
/// # Example
///
/// ```rust
/// use todo_service::domain::Todo;
/// use todo_service::service::{CrudService, TodoService};
/// use todo_service::storage::InMemoryRepository;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TodoService::new(InMemoryRepository::<Todo>::new());
///
/// let created = service.create(Todo::new("Buy milk", None)).await?;
/// let id = created.id().cloned().expect("created todos have an id");
///
/// let toggled = service.toggle_completion(&id).await?;
/// assert!(toggled.completed());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TodoService<R> {
    repository: R,
    ids: IdGenerator,
    locks: KeyedLocks<TodoId>,
}

impl<R> TodoService<R>
where
    R: Repository<TodoId, Todo>,
{
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            ids: IdGenerator,
            locks: KeyedLocks::new(),
        }
    }

    /// Flip the completion flag of a stored todo
    ///
    /// Only `completed` and `updated_at` change. Two toggles in a row leave
    /// the flag where it started.
    pub async fn toggle_completion(&self, id: &TodoId) -> RepositoryResult<Todo> {
        let _guard = self.locks.lock(id).await;

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id, RepositoryOperation::ToggleCompletion))?;

        let toggled = existing.with_completion(!existing.completed());
        let saved = self.repository.save(toggled).await?;

        tracing::info!(todo_id = %id, completed = saved.completed(), "Toggled todo completion");
        Ok(saved)
    }
}

impl<R> CrudService<Todo, TodoId> for TodoService<R>
where
    R: Repository<TodoId, Todo>,
{
    async fn create(&self, entity: Todo) -> RepositoryResult<Todo> {
        let todo = entity.persisted(self.ids.generate());
        let saved = self.repository.save(todo).await?;

        if let Some(id) = saved.id() {
            tracing::info!(todo_id = %id, title = saved.title(), "Created todo");
        }
        Ok(saved)
    }

    async fn find_by_id(&self, id: &TodoId) -> RepositoryResult<Option<Todo>> {
        tracing::debug!(todo_id = %id, "Finding todo");
        self.repository.find_by_id(id).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Todo>> {
        let todos = self.repository.find_all().await?;
        tracing::debug!(count = todos.len(), "Listed todos");
        Ok(todos)
    }

    async fn find_page(&self, request: PageRequest) -> RepositoryResult<Page<Todo>> {
        tracing::debug!(page = request.page(), size = request.size(), "Listing todo page");
        self.repository.find_page(&request).await
    }

    async fn update(&self, id: &TodoId, changes: Todo) -> RepositoryResult<Todo> {
        let _guard = self.locks.lock(id).await;

        let existing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id, RepositoryOperation::Update))?;

        let updated =
            existing.with_updates(changes.title(), changes.description().map(str::to_owned));
        let saved = self.repository.save(updated).await?;

        tracing::info!(todo_id = %id, "Updated todo");
        Ok(saved)
    }

    async fn delete(&self, id: &TodoId) -> RepositoryResult<()> {
        let _guard = self.locks.lock(id).await;

        if !self.repository.exists_by_id(id).await? {
            return Err(not_found(id, RepositoryOperation::Delete));
        }
        if !self.repository.delete_by_id(id).await? {
            return Err(not_found(id, RepositoryOperation::Delete));
        }

        tracing::info!(todo_id = %id, "Deleted todo");
        Ok(())
    }

    async fn exists(&self, id: &TodoId) -> RepositoryResult<bool> {
        self.repository.exists_by_id(id).await
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.repository.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::build_page_request;
    use crate::repository::RepositoryErrorKind;
    use crate::storage::InMemoryRepository;
    use std::sync::Arc;

    fn service() -> TodoService<InMemoryRepository<Todo>> {
        TodoService::new(InMemoryRepository::new())
    }

    async fn create(service: &TodoService<InMemoryRepository<Todo>>, title: &str) -> Todo {
        service.create(Todo::new(title, None)).await.unwrap()
    }

    fn id_of(todo: &Todo) -> TodoId {
        todo.id().cloned().unwrap()
    }

    /// Yields to the scheduler on every read, widening the window between a
    /// read and the following write.
    struct YieldingRepository(InMemoryRepository<Todo>);

    impl Repository<TodoId, Todo> for YieldingRepository {
        async fn save(&self, entity: Todo) -> RepositoryResult<Todo> {
            tokio::task::yield_now().await;
            self.0.save(entity).await
        }
        async fn find_by_id(&self, id: &TodoId) -> RepositoryResult<Option<Todo>> {
            let found = self.0.find_by_id(id).await;
            tokio::task::yield_now().await;
            found
        }
        async fn find_all(&self) -> RepositoryResult<Vec<Todo>> {
            self.0.find_all().await
        }
        async fn find_page(&self, request: &PageRequest) -> RepositoryResult<Page<Todo>> {
            self.0.find_page(request).await
        }
        async fn count(&self) -> RepositoryResult<u64> {
            self.0.count().await
        }
        async fn exists_by_id(&self, id: &TodoId) -> RepositoryResult<bool> {
            let exists = self.0.exists_by_id(id).await;
            tokio::task::yield_now().await;
            exists
        }
        async fn delete_by_id(&self, id: &TodoId) -> RepositoryResult<bool> {
            self.0.delete_by_id(id).await
        }
    }

    /// Every operation fails as if the database were down.
    struct UnavailableRepository;

    fn unavailable() -> RepositoryError {
        RepositoryError::connection_failed("connection refused")
    }

    impl Repository<TodoId, Todo> for UnavailableRepository {
        async fn save(&self, _: Todo) -> RepositoryResult<Todo> {
            Err(unavailable())
        }
        async fn find_by_id(&self, _: &TodoId) -> RepositoryResult<Option<Todo>> {
            Err(unavailable())
        }
        async fn find_all(&self) -> RepositoryResult<Vec<Todo>> {
            Err(unavailable())
        }
        async fn find_page(&self, _: &PageRequest) -> RepositoryResult<Page<Todo>> {
            Err(unavailable())
        }
        async fn count(&self) -> RepositoryResult<u64> {
            Err(unavailable())
        }
        async fn exists_by_id(&self, _: &TodoId) -> RepositoryResult<bool> {
            Err(unavailable())
        }
        async fn delete_by_id(&self, _: &TodoId) -> RepositoryResult<bool> {
            Err(unavailable())
        }
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let service = service();
        let created = service
            .create(Todo::new("Write docs", Some("for the service".into())))
            .await
            .unwrap();

        let id = id_of(&created);
        assert!(!created.completed());
        assert_eq!(created.created_at(), created.updated_at());

        let found = service.find_by_id(&id).await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn test_create_ignores_supplied_id_and_completion() {
        let service = service();
        let supplied = TodoId::new();
        let draft = Todo::new("t", None)
            .persisted(supplied.clone())
            .with_completion(true);

        let created = service.create(draft).await.unwrap();
        assert_ne!(created.id(), Some(&supplied));
        assert!(!created.completed());
    }

    #[tokio::test]
    async fn test_ids_follow_creation_order() {
        let service = service();
        let mut created = Vec::new();
        for n in 0..20 {
            created.push(create(&service, &format!("todo {n}")).await);
        }
        for pair in created.windows(2) {
            assert!(id_of(&pair[0]) < id_of(&pair[1]));
        }
        assert_eq!(service.find_all().await.unwrap(), created);
        assert_eq!(service.count().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_update_preserves_identity() {
        let service = service();
        let created = create(&service, "old").await;
        let id = id_of(&created);
        let completed = service.toggle_completion(&id).await.unwrap();

        let updated = service
            .update(&id, Todo::new("new", Some("details".into())).with_completion(false))
            .await
            .unwrap();

        assert_eq!(updated.id(), Some(&id));
        assert_eq!(updated.title(), "new");
        assert_eq!(updated.description(), Some("details"));
        assert!(updated.completed(), "update must not change completion");
        assert_eq!(updated.created_at(), created.created_at());
        assert!(updated.updated_at() > completed.updated_at());
    }

    #[tokio::test]
    async fn test_toggle_is_an_involution() {
        let service = service();
        let created = create(&service, "t").await;
        let id = id_of(&created);

        let once = service.toggle_completion(&id).await.unwrap();
        let twice = service.toggle_completion(&id).await.unwrap();

        assert!(once.completed());
        assert!(!twice.completed());
        assert_eq!(twice.title(), created.title());
        assert_eq!(twice.description(), created.description());
        assert_eq!(twice.created_at(), created.created_at());
        assert!(once.updated_at() > created.updated_at());
        assert!(twice.updated_at() > once.updated_at());
    }

    #[tokio::test]
    async fn test_not_found_symmetry() {
        let service = service();
        let missing = TodoId::new();

        assert_eq!(service.find_by_id(&missing).await.unwrap(), None);
        assert!(!service.exists(&missing).await.unwrap());

        let update = service.update(&missing, Todo::new("x", None)).await.unwrap_err();
        assert!(update.is_not_found());
        assert_eq!(update.operation, RepositoryOperation::Update);
        assert_eq!(update.entity_type.as_deref(), Some("Todo"));
        assert_eq!(update.entity_id.as_deref(), Some(missing.as_str()));

        let delete = service.delete(&missing).await.unwrap_err();
        assert!(delete.is_not_found());
        assert_eq!(delete.operation, RepositoryOperation::Delete);

        let toggle = service.toggle_completion(&missing).await.unwrap_err();
        assert!(toggle.is_not_found());
        assert_eq!(toggle.operation, RepositoryOperation::ToggleCompletion);

        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_terminal() {
        let service = service();
        let id = id_of(&create(&service, "t").await);

        service.delete(&id).await.unwrap();

        assert!(!service.exists(&id).await.unwrap());
        assert_eq!(service.find_by_id(&id).await.unwrap(), None);
        assert!(service.delete(&id).await.unwrap_err().is_not_found());
        assert!(service.toggle_completion(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_find_page() {
        let service = service();
        for title in ["b", "c", "a"] {
            create(&service, title).await;
        }
        let page = service
            .find_page(build_page_request(0, 2, Some("title"), None))
            .await
            .unwrap();
        let titles: Vec<&str> = page.content().iter().map(Todo::title).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(page.total_elements(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_toggles_are_serialized() {
        let service = Arc::new(TodoService::new(YieldingRepository(InMemoryRepository::new())));
        let id = id_of(&service.create(Todo::new("t", None)).await.unwrap());

        let tasks: Vec<_> = (0..25)
            .map(|_| {
                let service = Arc::clone(&service);
                let id = id.clone();
                tokio::spawn(async move { service.toggle_completion(&id).await.unwrap() })
            })
            .collect();

        let mut stamps = Vec::new();
        for task in tasks {
            stamps.push(task.await.unwrap().updated_at());
        }
        stamps.sort();
        stamps.dedup();

        // No lost updates: 25 distinct writes, odd count leaves it completed
        assert_eq!(stamps.len(), 25);
        let stored = service.find_by_id(&id).await.unwrap().unwrap();
        assert!(stored.completed());
        assert!(service.locks.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deletes_succeed_once() {
        let service = Arc::new(TodoService::new(YieldingRepository(InMemoryRepository::new())));
        let id = id_of(&service.create(Todo::new("t", None)).await.unwrap());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                let id = id.clone();
                tokio::spawn(async move { service.delete(&id).await })
            })
            .collect();

        let mut deleted = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => deleted += 1,
                Err(e) => assert!(e.is_not_found()),
            }
        }
        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn test_storage_faults_pass_through() {
        let service = TodoService::new(UnavailableRepository);
        let id = TodoId::new();

        let errors = [
            service.find_by_id(&id).await.unwrap_err(),
            service.update(&id, Todo::new("t", None)).await.unwrap_err(),
            service.delete(&id).await.unwrap_err(),
            service.toggle_completion(&id).await.unwrap_err(),
            service.create(Todo::new("t", None)).await.unwrap_err(),
        ];
        for error in errors {
            assert_eq!(error.kind, RepositoryErrorKind::ConnectionFailed);
            assert!(!error.is_not_found());
        }
    }
}
