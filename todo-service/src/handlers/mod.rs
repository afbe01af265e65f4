//! Generic REST handling for CRUD resources
//!
//! Everything here is written once and reused by every resource:
//!
//! - [`Resource`]: binds an entity to its service, mapper and collection path
//! - [`BaseHandler`]: create/list/get/update/delete for any [`Resource`]
//! - [`CollectionHandler`]: the same operations as a trait
//! - [`ValidatedJson`] and [`ResourcePath`]: request extractors
//! - [`ApiError`]: errors with automatic HTTP status code mapping
//!
//! # Integration with Axum
//!
//! The handler results implement `IntoResponse`, so route functions only
//! forward to the handler:
//!
//! ```rust,ignore
//! use axum::extract::State;
//! use todo_service::handlers::{ApiError, BaseHandler, ResourcePath};
//!
//! async fn get_todo(
//!     State(handler): State<BaseHandler<TodoResource<R>>>,
//!     id: ResourcePath<TodoResource<R>>,
//! ) -> Result<Json<TodoResponse>, ApiError> {
//!     handler.handle_get(id.into_inner()).await.map(Json)
//! }
//! ```

mod error;
mod extract;
mod query;
mod traits;

pub use error::{ApiError, ApiErrorKind, ApiOperation};
pub use extract::{describe_violations, FieldViolation, ResourcePath, Validate, ValidatedJson};
pub use query::ListQuery;
pub use traits::{BaseHandler, CollectionHandler, Resource};
