use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use todo_service::server::app;
use todo_service::state::AppState;

fn build_test_app() -> Router {
    app(AppState::default())
}

async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_hello() {
    let response = get(&build_test_app(), "/hello").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "message": "Hello World" }));
}

#[tokio::test]
async fn test_hello_by_name() {
    let response = get(&build_test_app(), "/hello/Ada").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "message": "Hello, Ada!" }));
}

#[tokio::test]
async fn test_api_health_is_up() {
    let response = get(&build_test_app(), "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "UP");
    assert!(body["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_liveness_and_readiness() {
    let app = build_test_app();

    let health = get(&app, "/health").await;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(body_json(health).await["status"], "healthy");

    let ready = get(&app, "/ready").await;
    assert_eq!(ready.status(), StatusCode::OK);
    let body = body_json(ready).await;
    assert_eq!(body["ready"], true);
    assert_eq!(body["dependencies"]["storage"]["healthy"], true);
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let response = get(&build_test_app(), "/nowhere").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({ "success": false, "data": null, "message": "Resource not found" })
    );
}
