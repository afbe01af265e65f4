//! Storage adapters
//!
//! - [`InMemoryRepository`]: process-local, the default backend
//! - [`PgTodoRepository`]: PostgreSQL via sqlx (requires the `database` feature)
//! - [`TodoStore`]: whichever of the two the configuration selects

mod memory;
#[cfg(feature = "database")]
mod postgres;
mod store;

pub use memory::InMemoryRepository;
#[cfg(feature = "database")]
pub use postgres::PgTodoRepository;
pub use store::TodoStore;
