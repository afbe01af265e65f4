//! Resource services
//!
//! [`CrudService`] is the entity-agnostic contract handlers are written
//! against; [`TodoService`] implements it for todos on top of any
//! [`Repository`](crate::repository::Repository).

mod crud;
mod locks;
mod todo;

pub use crud::CrudService;
pub use locks::{KeyedGuard, KeyedLocks};
pub use todo::TodoService;
