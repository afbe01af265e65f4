//! Storage adapter contract
//!
//! [`Repository`] is the persistence seam every resource service is written
//! against. Backends live in [`crate::storage`]; failures are reported as a
//! structured [`RepositoryError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use todo_service::repository::{Repository, RepositoryError, RepositoryOperation};
//!
//! async fn must_exist<R: Repository<TodoId, Todo>>(repo: &R, id: &TodoId) -> RepositoryResult<Todo> {
//!     repo.find_by_id(id).await?.ok_or_else(|| {
//!         RepositoryError::not_found("Todo", id.as_str())
//!             .with_operation(RepositoryOperation::FindById)
//!     })
//! }
//! ```

mod error;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use traits::{Repository, RepositoryResult};
