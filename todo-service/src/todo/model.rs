//! Wire shapes of the todo resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::handlers::{FieldViolation, Validate};
use crate::ids::TodoId;

/// Body of create and update requests
///
/// Only the editable fields; identity, completion and timestamps are owned
/// by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TodoRequest {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
        }
    }
}

impl Validate for TodoRequest {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        if self.title.trim().is_empty() {
            return Err(vec![FieldViolation::new(
                "title",
                "Title is required and cannot be empty",
            )]);
        }
        Ok(())
    }
}

/// A todo as callers see it
///
/// Timestamps serialize as RFC 3339 strings. `id` is only null for a draft
/// that was never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: Option<TodoId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_is_rejected() {
        let violations = TodoRequest::new(" \t", None).validate().unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "title");
    }

    #[test]
    fn test_description_is_optional() {
        let request: TodoRequest = serde_json::from_str(r#"{"title":"Write docs"}"#).unwrap();
        assert_eq!(request, TodoRequest::new("Write docs", None));
        assert!(request.validate().is_ok());
    }
}
