use std::cmp::Ordering;

use chrono::{DateTime, Duration, SubsecRound, Utc};

use super::Entity;
use crate::ids::TodoId;
use crate::pagination::SortableFields;

/// A todo item
///
/// Values are immutable: [`with_updates`](Todo::with_updates) and
/// [`with_completion`](Todo::with_completion) return a new `Todo` with a
/// refreshed `updated_at`, leaving the original untouched.
///
/// Timestamps are kept at microsecond precision so every storage backend
/// returns exactly what it was given.
///
/// # Example
///
/// ```rust
/// use todo_service::domain::Todo;
/// use todo_service::ids::TodoId;
///
/// let draft = Todo::new("Buy milk", None);
/// assert!(draft.id().is_none());
///
/// let stored = draft.persisted(TodoId::new());
/// let done = stored.with_completion(true);
/// assert!(done.completed());
/// assert!(!stored.completed());
/// assert!(done.updated_at() > stored.updated_at());
/// assert_eq!(done.created_at(), stored.created_at());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id: Option<TodoId>,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Current time at microsecond precision
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly after `previous`, even if the clock has not moved
fn refreshed(previous: DateTime<Utc>) -> DateTime<Utc> {
    now().max(previous + Duration::microseconds(1))
}

impl Todo {
    /// A draft todo: no id, not completed
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        let at = now();
        Self {
            id: None,
            title: title.into(),
            description,
            completed: false,
            created_at: at,
            updated_at: at,
        }
    }

    /// Assign the identifier and stamp both timestamps with the current time
    ///
    /// Any completion flag on the draft is dropped; new todos always start
    /// open.
    #[must_use]
    pub fn persisted(self, id: TodoId) -> Self {
        let at = now();
        Self {
            id: Some(id),
            completed: false,
            created_at: at,
            updated_at: at,
            ..self
        }
    }

    /// Rebuild a stored todo exactly as it was saved
    pub fn restore(
        id: TodoId,
        title: String,
        description: Option<String>,
        completed: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            title,
            description,
            completed,
            created_at,
            updated_at,
        }
    }

    /// A copy with a new title and description
    ///
    /// `id`, `completed` and `created_at` carry over unchanged.
    #[must_use]
    pub fn with_updates(&self, title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: self.id.clone(),
            title: title.into(),
            description,
            completed: self.completed,
            created_at: self.created_at,
            updated_at: refreshed(self.updated_at),
        }
    }

    /// A copy with the given completion flag
    #[must_use]
    pub fn with_completion(&self, completed: bool) -> Self {
        Self {
            completed,
            updated_at: refreshed(self.updated_at),
            ..self.clone()
        }
    }

    pub fn id(&self) -> Option<&TodoId> {
        self.id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Todo {
    type Id = TodoId;

    const KIND: &'static str = "Todo";

    fn id(&self) -> Option<&TodoId> {
        self.id.as_ref()
    }
}

impl SortableFields for Todo {
    fn compare_field(&self, other: &Self, field: &str) -> Option<Ordering> {
        let ordering = match field {
            "id" => self.id.cmp(&other.id),
            "title" => self.title.cmp(&other.title),
            "description" => self.description.cmp(&other.description),
            "completed" => self.completed.cmp(&other.completed),
            "createdAt" | "created_at" => self.created_at.cmp(&other.created_at),
            "updatedAt" | "updated_at" => self.updated_at.cmp(&other.updated_at),
            _ => return None,
        };
        Some(ordering)
    }
}
