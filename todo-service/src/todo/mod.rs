//! The todo resource
//!
//! Everything todo-specific on top of the generic framework: the wire
//! shapes, the mapper, the [`Resource`](crate::handlers::Resource) binding
//! and the axum routes.

mod mapper;
mod model;
mod resource;
mod routes;

pub use mapper::TodoMapper;
pub use model::{TodoRequest, TodoResponse};
pub use resource::{TodoHandler, TodoResource, TODO_COLLECTION_PATH};
pub use routes::router;
