//! Domain entities
//!
//! Entities are immutable values. A change produces a new value; nothing is
//! ever modified in place.

use std::fmt;

mod todo;

pub use todo::Todo;

/// A storable entity with an optional, assign-once identifier
pub trait Entity: Clone + Send + Sync + 'static {
    /// Identifier type
    type Id: Clone + Ord + fmt::Display + Send + Sync + 'static;

    /// Resource kind used in error context and logs (e.g. `"Todo"`)
    const KIND: &'static str;

    /// The identifier, absent before first persistence
    fn id(&self) -> Option<&Self::Id>;
}
