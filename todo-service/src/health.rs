//! Health check and greeting handlers
//!
//! - `GET /health`: liveness probe
//! - `GET /ready`: readiness probe, checks the storage backend
//! - `GET /api/health`: `{"status":"UP","timestamp":<millis>}`
//! - `GET /hello` and `GET /hello/{name}`: greetings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service name
    pub service: String,

    /// Version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Readiness check response with dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Overall readiness status
    pub ready: bool,

    /// Service name
    pub service: String,

    /// Dependency statuses
    pub dependencies: HashMap<String, DependencyStatus>,
}

/// Individual dependency status
#[derive(Debug, Serialize, Deserialize)]
pub struct DependencyStatus {
    /// Dependency is healthy
    pub healthy: bool,

    /// Optional message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Status report of the public health endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Body of the greeting endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct Greeting {
    pub message: String,
}

/// Health and greeting routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(readiness))
        .route("/api/health", get(status))
        .route("/hello", get(hello))
        .route("/hello/{name}", get(greet))
        .with_state(state)
}

/// Simple health check (liveness probe)
///
/// Always returns 200 OK if the service is running.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        service: state.config().service.name.clone(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check with dependency validation (readiness probe)
///
/// Returns 200 OK if storage answers, 503 Service Unavailable otherwise.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store();
    let storage = match store.ping().await {
        Ok(()) => DependencyStatus {
            healthy: true,
            message: Some(format!("{} backend available", store.backend())),
        },
        Err(e) => {
            tracing::error!("Storage health check failed: {}", e);
            DependencyStatus {
                healthy: false,
                message: Some(format!("{} backend unavailable", store.backend())),
            }
        }
    };

    let ready = storage.healthy;
    let mut dependencies = HashMap::new();
    dependencies.insert("storage".to_string(), storage);

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = ReadinessResponse {
        ready,
        service: state.config().service.name.clone(),
        dependencies,
    };

    (status, Json(response))
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "UP".to_string(),
        timestamp: Utc::now().timestamp_millis(),
    })
}

pub async fn hello() -> Json<Greeting> {
    Json(Greeting {
        message: "Hello World".to_string(),
    })
}

pub async fn greet(Path(name): Path<String>) -> Json<Greeting> {
    Json(Greeting {
        message: greeting_for(&name),
    })
}

/// `Hello, {name}!`, greeting the world when the name is blank
pub fn greeting_for(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        "Hello, World!".to_string()
    } else {
        format!("Hello, {name}!")
    }
}
