//! # todo-service
//!
//! A Todo REST service built on a generic, reusable CRUD resource framework.
//!
//! ## Features
//!
//! - **Generic resources**: one handler ([`handlers::BaseHandler`]) serves
//!   any entity through the [`handlers::Resource`] binding
//! - **Immutable entities**: every mutation yields a new value with a
//!   strictly later `updated_at`
//! - **Sortable identifiers**: time-ordered ids, so listing in id order is
//!   listing in creation order
//! - **Per-id serialization**: concurrent updates, deletes and toggles of
//!   the same todo never interleave
//! - **Pluggable storage**: in-memory by default, PostgreSQL with the
//!   `database` feature
//! - **Middleware stack**: request ids, tracing, body limits, timeouts,
//!   compression, CORS, panic recovery
//! - **Graceful shutdown**: proper signal handling (SIGTERM, SIGINT)
//!
//! ## Example
//!
//! ```rust,no_run
//! use todo_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::connect(config.clone()).await?;
//!     Server::new(config).serve(state).await
//! }
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod ids;
pub mod mapper;
pub mod middleware;
pub mod observability;
pub mod pagination;
pub mod repository;
pub mod responses;
pub mod server;
pub mod service;
pub mod state;
pub mod storage;
pub mod todo;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, StorageBackend};
    pub use crate::domain::{Entity, Todo};
    pub use crate::error::{Error, Result};
    pub use crate::handlers::{
        ApiError, ApiErrorKind, BaseHandler, CollectionHandler, ListQuery, Resource,
        ResourcePath, Validate, ValidatedJson,
    };
    pub use crate::ids::{IdGenerator, RequestId, TodoId};
    pub use crate::mapper::Mapper;
    pub use crate::observability::{init_tracing, shutdown_tracing};
    pub use crate::pagination::{Page, PageEnvelope, PageRequest};
    pub use crate::repository::{Repository, RepositoryError, RepositoryResult};
    pub use crate::responses::{ApiResponse, Created, NoContent};
    pub use crate::server::{app, Server};
    pub use crate::service::{CrudService, TodoService};
    pub use crate::state::AppState;
    pub use crate::storage::{InMemoryRepository, TodoStore};
    pub use crate::todo::{TodoRequest, TodoResponse};
}
