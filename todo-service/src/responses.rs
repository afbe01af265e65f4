//! HTTP response builders and the uniform result envelope
//!
//! - [`ApiResponse`]: `{ success, data, message }` wrapper for transports
//!   that want a uniform success/error shape
//! - [`Created`]: 201 with an optional `Location` header
//! - [`NoContent`]: 204 with no body
//!
//! ```rust
//! use todo_service::responses::ApiResponse;
//!
//! let created = ApiResponse::created(42);
//! assert!(created.success);
//! assert_eq!(created.data, Some(42));
//! assert_eq!(created.message.as_deref(), Some("Resource created successfully"));
//!
//! let failed = ApiResponse::<()>::error("Todo not found");
//! assert!(!failed.success);
//! assert!(failed.data.is_none());
//! ```

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Message attached to a creation envelope
pub const CREATED_MESSAGE: &str = "Resource created successfully";

/// Message attached to an envelope with nothing to return
pub const COMPLETED_MESSAGE: &str = "Operation completed successfully";

// ============================================================================
// Result envelope
// ============================================================================

/// Uniform result envelope
///
/// Serializes as `{"success": bool, "data": T | null, "message": string | null}`.
/// Responds with 200 OK unless paired with another status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Result payload, absent on failure or when there is nothing to return
    pub data: Option<T>,
    /// Optional human-readable message
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful result without a message
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// Successful result with a message
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }

    /// Successful creation
    pub fn created(data: T) -> Self {
        Self::ok_with_message(data, CREATED_MESSAGE)
    }

    /// Successful operation with nothing to return
    pub fn completed() -> Self {
        Self {
            success: true,
            data: None,
            message: Some(COMPLETED_MESSAGE.to_string()),
        }
    }

    /// Failed operation
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Pair the envelope with a status code
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        self.with_status(status).into_response()
    }
}

// ============================================================================
// 201 Created
// ============================================================================

/// HTTP 201 Created response
///
/// Optionally includes a `Location` header pointing to the new resource.
#[derive(Debug)]
pub struct Created<T> {
    data: T,
    location: Option<String>,
}

impl<T> Created<T> {
    /// Create a new 201 Created response
    pub fn new(data: T) -> Self {
        Self {
            data,
            location: None,
        }
    }

    /// Add a Location header pointing to the created resource
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// The response body
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The Location header value, if any
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        let mut response = (StatusCode::CREATED, Json(&self.data)).into_response();

        if let Some(location) = self.location {
            if let Ok(header_value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, header_value);
            }
        }

        response
    }
}

// ============================================================================
// 204 No Content
// ============================================================================

/// HTTP 204 No Content response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        id: u64,
        name: String,
    }

    #[test]
    fn test_created_response() {
        let data = TestData {
            id: 1,
            name: "Test".to_string(),
        };
        let response = Created::new(data).with_location("/test/1").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/test/1"
        );
    }

    #[test]
    fn test_created_without_location() {
        let response = Created::new(1).into_response();
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    #[test]
    fn test_no_content_response() {
        let response = NoContent.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn test_envelope_shapes() {
        let ok = serde_json::to_value(ApiResponse::ok(1)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "data": 1, "message": null}));

        let done = serde_json::to_value(ApiResponse::<()>::completed()).unwrap();
        assert_eq!(
            done,
            serde_json::json!({"success": true, "data": null, "message": COMPLETED_MESSAGE})
        );

        let failed = serde_json::to_value(ApiResponse::<()>::error("boom")).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"success": false, "data": null, "message": "boom"})
        );
    }

    #[test]
    fn test_envelope_status() {
        assert_eq!(ApiResponse::ok(1).into_response().status(), StatusCode::OK);
        assert_eq!(
            ApiResponse::<()>::error("x")
                .with_status(StatusCode::NOT_FOUND)
                .into_response()
                .status(),
            StatusCode::NOT_FOUND
        );
    }
}
