//! Axum routes of the todo resource
//!
//! | Method | Path                          | Result                              |
//! |--------|-------------------------------|-------------------------------------|
//! | POST   | `/api/v1/sql/todo`            | 201 + `Location`                    |
//! | GET    | `/api/v1/sql/todo`            | every todo, oldest first            |
//! | GET    | `/api/v1/sql/todo/page`       | `ApiResponse<PageEnvelope<_>>`      |
//! | GET    | `/api/v1/sql/todo/{id}`       | one todo or 404                     |
//! | PUT    | `/api/v1/sql/todo/{id}`       | updated todo or 404                 |
//! | PATCH  | `/api/v1/sql/todo/{id}/toggle`| toggled todo or 404                 |
//! | DELETE | `/api/v1/sql/todo/{id}`       | 204 or 404                          |

use axum::{
    extract::{Query, State},
    routing::{get, patch, post},
    Json, Router,
};

use super::model::{TodoRequest, TodoResponse};
use super::resource::{TodoHandler, TodoResource, TODO_COLLECTION_PATH};
use crate::domain::Todo;
use crate::handlers::{ApiError, ListQuery, Resource, ResourcePath, ValidatedJson};
use crate::ids::TodoId;
use crate::pagination::PageEnvelope;
use crate::repository::Repository;
use crate::responses::{ApiResponse, Created, NoContent};

type TodoPath<R> = ResourcePath<TodoResource<R>>;

/// Todo routes with their handler attached
pub fn router<R, S>(handler: TodoHandler<R>) -> Router<S>
where
    R: Repository<TodoId, Todo> + 'static,
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(TODO_COLLECTION_PATH, post(create::<R>).get(list::<R>))
        .route(&format!("{TODO_COLLECTION_PATH}/page"), get(list_page::<R>))
        .route(
            &format!("{TODO_COLLECTION_PATH}/{{id}}"),
            get(find_one::<R>).put(update::<R>).delete(delete::<R>),
        )
        .route(
            &format!("{TODO_COLLECTION_PATH}/{{id}}/toggle"),
            patch(toggle::<R>),
        )
        .with_state(handler)
}

async fn create<R>(
    State(handler): State<TodoHandler<R>>,
    ValidatedJson(request): ValidatedJson<TodoRequest>,
) -> Result<Created<TodoResponse>, ApiError>
where
    R: Repository<TodoId, Todo> + 'static,
{
    handler.handle_create(request).await
}

async fn list<R>(State(handler): State<TodoHandler<R>>) -> Result<Json<Vec<TodoResponse>>, ApiError>
where
    R: Repository<TodoId, Todo> + 'static,
{
    handler.handle_list().await.map(Json)
}

async fn list_page<R>(
    State(handler): State<TodoHandler<R>>,
    Query(query): Query<ListQuery>,
) -> Result<ApiResponse<PageEnvelope<TodoResponse>>, ApiError>
where
    R: Repository<TodoId, Todo> + 'static,
{
    handler.handle_list_page(query).await.map(ApiResponse::ok)
}

async fn find_one<R>(
    State(handler): State<TodoHandler<R>>,
    id: TodoPath<R>,
) -> Result<Json<TodoResponse>, ApiError>
where
    R: Repository<TodoId, Todo> + 'static,
{
    handler.handle_get(id.into_inner()).await.map(Json)
}

async fn update<R>(
    State(handler): State<TodoHandler<R>>,
    id: TodoPath<R>,
    ValidatedJson(request): ValidatedJson<TodoRequest>,
) -> Result<Json<TodoResponse>, ApiError>
where
    R: Repository<TodoId, Todo> + 'static,
{
    handler.handle_update(id.into_inner(), request).await.map(Json)
}

async fn toggle<R>(
    State(handler): State<TodoHandler<R>>,
    id: TodoPath<R>,
) -> Result<Json<TodoResponse>, ApiError>
where
    R: Repository<TodoId, Todo> + 'static,
{
    let id = id.into_inner();
    tracing::info!(todo_id = %id, "Toggling todo completion");

    let toggled = handler.resource().service().toggle_completion(&id).await?;
    Ok(Json(handler.respond(&toggled)))
}

async fn delete<R>(
    State(handler): State<TodoHandler<R>>,
    id: TodoPath<R>,
) -> Result<NoContent, ApiError>
where
    R: Repository<TodoId, Todo> + 'static,
{
    handler.handle_delete(id.into_inner()).await
}
