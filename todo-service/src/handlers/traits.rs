//! Generic resource handler
//!
//! [`BaseHandler`] implements create/list/get/update/delete once, against
//! the [`Resource`] binding trait. A concrete resource only says which
//! service and mapper it uses, how to read an entity's id, and where the
//! collection lives; the handler logic itself is never repeated.
//!
//! Uses RPITIT (Return Position Impl Trait In Traits) for the
//! [`CollectionHandler`] trait, so no `async_trait` is needed.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use super::error::ApiError;
use super::query::ListQuery;
use crate::mapper::Mapper;
use crate::pagination::{build_page_envelope, PageEnvelope, PageLimits};
use crate::responses::{Created, NoContent};
use crate::service::CrudService;

/// Binding of one resource type to the generic handler
///
/// # Example
///
/// ```rust,ignore
/// impl Resource for TodoResource<R> {
///     type Entity = Todo;
///     type Id = TodoId;
///     type Request = TodoRequest;
///     type Response = TodoResponse;
///     type Service = TodoService<R>;
///     type Mapper = TodoMapper;
///
///     const NAME: &'static str = "Todo";
///     const COLLECTION_PATH: &'static str = "/api/v1/sql/todo";
///
///     fn service(&self) -> &Self::Service { &self.service }
///     fn mapper(&self) -> &Self::Mapper { &TodoMapper }
///     fn entity_id(entity: &Todo) -> Option<TodoId> { entity.id().cloned() }
/// }
/// ```
pub trait Resource: Send + Sync + 'static {
    /// Stored entity
    type Entity: Send + Sync + 'static;
    /// Entity identifier
    type Id: Clone + fmt::Display + Send + Sync + 'static;
    /// Validated inbound shape
    type Request: Send + 'static;
    /// Outbound shape
    type Response: Serialize + Send + 'static;
    /// CRUD implementation for the entity
    type Service: CrudService<Self::Entity, Self::Id>;
    /// Converts between entity and transport shapes
    type Mapper: Mapper<Self::Entity, Self::Request, Self::Response>;

    /// Resource kind used in errors and logs (e.g. `"Todo"`)
    const NAME: &'static str;

    /// Path of the collection, without a trailing slash
    const COLLECTION_PATH: &'static str;

    fn service(&self) -> &Self::Service;

    fn mapper(&self) -> &Self::Mapper;

    /// Identifier of a persisted entity
    fn entity_id(entity: &Self::Entity) -> Option<Self::Id>;
}

/// Standard REST collection operations
///
/// # Type Parameters
///
/// - `Id`: The identifier type for the entity
/// - `Req`: The request shape accepted by create and update
/// - `Res`: The response shape returned to callers
pub trait CollectionHandler<Id, Req, Res>: Send + Sync {
    /// One page of the collection
    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = Result<PageEnvelope<Res>, ApiError>> + Send;

    /// A single item
    ///
    /// # Errors
    ///
    /// Returns `ApiError` with `NotFound` kind if the entity doesn't exist.
    fn get(&self, id: Id) -> impl Future<Output = Result<Res, ApiError>> + Send;

    /// Create an item
    fn create(&self, dto: Req) -> impl Future<Output = Result<Created<Res>, ApiError>> + Send;

    /// Replace the editable fields of an item
    fn update(&self, id: Id, dto: Req) -> impl Future<Output = Result<Res, ApiError>> + Send;

    /// Remove an item
    fn delete(&self, id: Id) -> impl Future<Output = Result<NoContent, ApiError>> + Send;
}

/// Create/read/update/delete/list handling for any [`Resource`]
///
/// Cloning is cheap; clones share the resource.
pub struct BaseHandler<R> {
    resource: Arc<R>,
    limits: PageLimits,
}

impl<R> Clone for BaseHandler<R> {
    fn clone(&self) -> Self {
        Self {
            resource: Arc::clone(&self.resource),
            limits: self.limits,
        }
    }
}

impl<R: Resource> fmt::Debug for BaseHandler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseHandler")
            .field("resource", &R::NAME)
            .field("limits", &self.limits)
            .finish()
    }
}

impl<R: Resource> BaseHandler<R> {
    pub fn new(resource: R) -> Self {
        Self {
            resource: Arc::new(resource),
            limits: PageLimits::default(),
        }
    }

    /// Use custom page size limits for paginated listing
    #[must_use]
    pub fn with_page_limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Map an entity to its response shape
    pub fn respond(&self, entity: &R::Entity) -> R::Response {
        self.resource.mapper().to_response(entity)
    }

    /// Location of a single item
    pub fn location_of(id: &R::Id) -> String {
        format!("{}/{}", R::COLLECTION_PATH, id)
    }

    pub async fn handle_create(&self, request: R::Request) -> Result<Created<R::Response>, ApiError> {
        tracing::info!(resource = R::NAME, "Creating new {}", R::NAME);

        let entity = self.resource.mapper().to_entity(request);
        let created = self.resource.service().create(entity).await?;
        let response = Created::new(self.respond(&created));

        match R::entity_id(&created) {
            Some(id) => {
                let location = Self::location_of(&id);
                tracing::info!(resource = R::NAME, location = %location, "Created {}", R::NAME);
                Ok(response.with_location(location))
            }
            None => Ok(response),
        }
    }

    /// Every item, in the order the service returns them
    pub async fn handle_list(&self) -> Result<Vec<R::Response>, ApiError> {
        tracing::debug!(resource = R::NAME, "Fetching all {}", R::NAME);

        let entities = self.resource.service().find_all().await?;
        let responses = self.resource.mapper().to_responses(&entities);

        tracing::debug!(resource = R::NAME, count = responses.len(), "Returning {}", R::NAME);
        Ok(responses)
    }

    pub async fn handle_list_page(
        &self,
        query: ListQuery,
    ) -> Result<PageEnvelope<R::Response>, ApiError> {
        let request = query.to_page_request(&self.limits);
        tracing::debug!(
            resource = R::NAME,
            page = request.page(),
            size = request.size(),
            "Fetching page of {}", R::NAME
        );

        let page = self.resource.service().find_page(request).await?;
        let mapper = self.resource.mapper();
        Ok(build_page_envelope(page.map(|e| mapper.to_response(&e))))
    }

    pub async fn handle_get(&self, id: R::Id) -> Result<R::Response, ApiError> {
        tracing::debug!(resource = R::NAME, id = %id, "Fetching {} by id", R::NAME);

        self.resource
            .service()
            .find_by_id(&id)
            .await?
            .map(|entity| self.respond(&entity))
            .ok_or_else(|| ApiError::not_found(R::NAME, id.to_string()))
    }

    pub async fn handle_update(
        &self,
        id: R::Id,
        request: R::Request,
    ) -> Result<R::Response, ApiError> {
        tracing::info!(resource = R::NAME, id = %id, "Updating {}", R::NAME);

        let changes = self.resource.mapper().to_entity(request);
        let updated = self.resource.service().update(&id, changes).await?;
        Ok(self.respond(&updated))
    }

    pub async fn handle_delete(&self, id: R::Id) -> Result<NoContent, ApiError> {
        tracing::info!(resource = R::NAME, id = %id, "Deleting {}", R::NAME);

        self.resource.service().delete(&id).await?;
        Ok(NoContent)
    }
}

impl<R: Resource> CollectionHandler<R::Id, R::Request, R::Response> for BaseHandler<R> {
    async fn list(&self, query: ListQuery) -> Result<PageEnvelope<R::Response>, ApiError> {
        self.handle_list_page(query).await
    }

    async fn get(&self, id: R::Id) -> Result<R::Response, ApiError> {
        self.handle_get(id).await
    }

    async fn create(&self, dto: R::Request) -> Result<Created<R::Response>, ApiError> {
        self.handle_create(dto).await
    }

    async fn update(&self, id: R::Id, dto: R::Request) -> Result<R::Response, ApiError> {
        self.handle_update(id, dto).await
    }

    async fn delete(&self, id: R::Id) -> Result<NoContent, ApiError> {
        self.handle_delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ApiErrorKind;
    use crate::pagination::{Page, PageRequest};
    use crate::repository::{RepositoryError, RepositoryResult};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Mutex;

    // A deliberately different resource: numeric ids, string entities
    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: Option<u64>,
        label: String,
    }

    #[derive(Default)]
    struct TagService {
        next: AtomicU64,
        tags: Mutex<BTreeMap<u64, Tag>>,
    }

    impl CrudService<Tag, u64> for TagService {
        async fn create(&self, entity: Tag) -> RepositoryResult<Tag> {
            let id = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            let tag = Tag {
                id: Some(id),
                ..entity
            };
            self.tags.lock().await.insert(id, tag.clone());
            Ok(tag)
        }
        async fn find_by_id(&self, id: &u64) -> RepositoryResult<Option<Tag>> {
            Ok(self.tags.lock().await.get(id).cloned())
        }
        async fn find_all(&self) -> RepositoryResult<Vec<Tag>> {
            Ok(self.tags.lock().await.values().cloned().collect())
        }
        async fn find_page(&self, request: PageRequest) -> RepositoryResult<Page<Tag>> {
            let all: Vec<Tag> = self.tags.lock().await.values().cloned().collect();
            Ok(Page::from_slice(&all, &request))
        }
        async fn update(&self, id: &u64, changes: Tag) -> RepositoryResult<Tag> {
            let mut tags = self.tags.lock().await;
            let tag = tags
                .get_mut(id)
                .ok_or_else(|| RepositoryError::not_found("Tag", id.to_string()))?;
            tag.label = changes.label;
            Ok(tag.clone())
        }
        async fn delete(&self, id: &u64) -> RepositoryResult<()> {
            self.tags
                .lock()
                .await
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| RepositoryError::not_found("Tag", id.to_string()))
        }
        async fn exists(&self, id: &u64) -> RepositoryResult<bool> {
            Ok(self.tags.lock().await.contains_key(id))
        }
        async fn count(&self) -> RepositoryResult<u64> {
            Ok(self.tags.lock().await.len() as u64)
        }
    }

    struct TagMapper;

    impl Mapper<Tag, String, String> for TagMapper {
        fn to_entity(&self, request: String) -> Tag {
            Tag {
                id: None,
                label: request,
            }
        }
        fn to_response(&self, entity: &Tag) -> String {
            format!("#{}", entity.label)
        }
    }

    #[derive(Default)]
    struct TagResource {
        service: TagService,
    }

    impl Resource for TagResource {
        type Entity = Tag;
        type Id = u64;
        type Request = String;
        type Response = String;
        type Service = TagService;
        type Mapper = TagMapper;

        const NAME: &'static str = "Tag";
        const COLLECTION_PATH: &'static str = "/tags";

        fn service(&self) -> &TagService {
            &self.service
        }
        fn mapper(&self) -> &TagMapper {
            &TagMapper
        }
        fn entity_id(entity: &Tag) -> Option<u64> {
            entity.id
        }
    }

    fn handler() -> BaseHandler<TagResource> {
        BaseHandler::new(TagResource::default())
    }

    #[tokio::test]
    async fn test_create_sets_location() {
        let handler = handler();
        let created = handler.handle_create("rust".to_string()).await.unwrap();
        assert_eq!(created.data(), "#rust");
        assert_eq!(created.location(), Some("/tags/1"));
    }

    #[tokio::test]
    async fn test_list_preserves_order() {
        let handler = handler();
        for label in ["b", "a", "c"] {
            handler.handle_create(label.to_string()).await.unwrap();
        }
        assert_eq!(handler.handle_list().await.unwrap(), vec!["#b", "#a", "#c"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let err = handler().handle_get(7).await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::NotFound);
        assert_eq!(err.entity_type.as_deref(), Some("Tag"));
        assert_eq!(err.entity_id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_update_and_delete_propagate_not_found() {
        let handler = handler();
        let update = handler.handle_update(9, "x".into()).await.unwrap_err();
        assert_eq!(update.kind, ApiErrorKind::NotFound);
        let delete = handler.handle_delete(9).await.unwrap_err();
        assert_eq!(delete.kind, ApiErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_collection_handler_round_trip() {
        let handler = handler();
        let created = CollectionHandler::create(&handler, "one".into()).await.unwrap();
        assert_eq!(created.location(), Some("/tags/1"));

        let updated = CollectionHandler::update(&handler, 1, "uno".into()).await.unwrap();
        assert_eq!(updated, "#uno");
        assert_eq!(CollectionHandler::get(&handler, 1).await.unwrap(), "#uno");

        let page = CollectionHandler::list(&handler, ListQuery::new().with_size(10))
            .await
            .unwrap();
        assert_eq!(page.content, vec!["#uno"]);
        assert_eq!(page.total_elements, 1);

        CollectionHandler::delete(&handler, 1).await.unwrap();
        assert!(CollectionHandler::get(&handler, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_list_page_applies_limits() {
        let handler = handler().with_page_limits(PageLimits {
            default_size: 2,
            max_size: 3,
        });
        for label in ["a", "b", "c", "d", "e"] {
            handler.handle_create(label.to_string()).await.unwrap();
        }

        let default = handler.handle_list_page(ListQuery::new()).await.unwrap();
        assert_eq!(default.page_size, 2);
        assert_eq!(default.total_pages, 3);

        let clamped = handler
            .handle_list_page(ListQuery::new().with_size(50).with_page(1))
            .await
            .unwrap();
        assert_eq!(clamped.page_size, 3);
        assert_eq!(clamped.content, vec!["#d", "#e"]);
        assert!(clamped.is_last);
    }
}
