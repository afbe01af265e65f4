use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use todo_service::config::Config;
use todo_service::server::app;
use todo_service::state::AppState;
use todo_service::storage::TodoStore;

const TODOS: &str = "/api/v1/sql/todo";

/// Full application over a fresh in-memory store
fn build_test_app() -> Router {
    app(AppState::new(Config::default(), TodoStore::memory()))
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_todo(app: &Router, title: &str) -> Value {
    let response = send(app, json_request(Method::POST, TODOS, json!({ "title": title }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_create_returns_location_and_body() {
    let app = build_test_app();

    let response = send(
        &app,
        json_request(
            Method::POST,
            TODOS,
            json!({ "title": "Buy milk", "description": "Semi-skimmed" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let body = body_json(response).await;
    let id = body["id"].as_str().unwrap();
    assert_eq!(location, format!("{TODOS}/{id}"));
    assert_eq!(body["title"], "Buy milk");
    assert_eq!(body["description"], "Semi-skimmed");
    assert_eq!(body["completed"], false);
    assert_eq!(body["createdAt"], body["updatedAt"]);

    let fetched = send(&app, empty_request(Method::GET, &location)).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(body_json(fetched).await, body);
}

#[tokio::test]
async fn test_create_then_toggle_twice_then_delete() {
    let app = build_test_app();
    let created = create_todo(&app, "Write report").await;
    let item = format!("{TODOS}/{}", created["id"].as_str().unwrap());
    let toggle = format!("{item}/toggle");

    let first = send(&app, empty_request(Method::PATCH, &toggle)).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first = body_json(first).await;
    assert_eq!(first["completed"], true);
    assert_eq!(first["createdAt"], created["createdAt"]);

    let second = body_json(send(&app, empty_request(Method::PATCH, &toggle)).await).await;
    assert_eq!(second["completed"], false);
    assert_eq!(second["id"], created["id"]);

    let deleted = send(&app, empty_request(Method::DELETE, &item)).await;
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = send(&app, empty_request(Method::GET, &item)).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    let error = body_json(gone).await;
    assert_eq!(error["code"], "NOT_FOUND");
    assert_eq!(error["entity_type"], "Todo");
}

#[tokio::test]
async fn test_update_keeps_identity_and_completion() {
    let app = build_test_app();
    let created = create_todo(&app, "Draft").await;
    let item = format!("{TODOS}/{}", created["id"].as_str().unwrap());

    send(&app, empty_request(Method::PATCH, &format!("{item}/toggle"))).await;

    let response = send(
        &app,
        json_request(Method::PUT, &item, json!({ "title": "Final", "description": "v2" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["description"], "v2");
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert_ne!(updated["updatedAt"], created["updatedAt"]);
}

#[tokio::test]
async fn test_list_returns_creation_order() {
    let app = build_test_app();
    for title in ["first", "second", "third"] {
        create_todo(&app, title).await;
    }

    let response = send(&app, empty_request(Method::GET, TODOS)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let titles: Vec<String> = body_json(response)
        .await
        .as_array()
        .unwrap()
        .iter()
        .map(|todo| todo["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["first", "second", "third"]);
}

#[tokio::test]
async fn test_page_endpoint_wraps_envelope() {
    let app = build_test_app();
    for title in ["a", "b", "c", "d", "e"] {
        create_todo(&app, title).await;
    }

    let response = send(
        &app,
        empty_request(Method::GET, &format!("{TODOS}/page?page=1&size=2")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let page = &body["data"];
    assert_eq!(page["pageNumber"], 1);
    assert_eq!(page["pageSize"], 2);
    assert_eq!(page["totalElements"], 5);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["isFirst"], false);
    assert_eq!(page["isLast"], false);
    assert_eq!(page["content"][0]["title"], "c");
    assert_eq!(page["content"][1]["title"], "d");
}

#[tokio::test]
async fn test_page_endpoint_clamps_and_sorts() {
    let app = build_test_app();
    for title in ["pear", "apple", "fig"] {
        create_todo(&app, title).await;
    }

    let response = send(
        &app,
        empty_request(
            Method::GET,
            &format!("{TODOS}/page?page=-3&size=1000&sort=title&direction=DESC"),
        ),
    )
    .await;
    let page = body_json(response).await["data"].clone();

    assert_eq!(page["pageNumber"], 0);
    assert_eq!(page["pageSize"], 100);
    assert_eq!(page["isFirst"], true);
    assert_eq!(page["isLast"], true);
    let titles: Vec<&str> = page["content"]
        .as_array()
        .unwrap()
        .iter()
        .map(|todo| todo["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["pear", "fig", "apple"]);
}

#[tokio::test]
async fn test_blank_title_is_unprocessable() {
    let app = build_test_app();

    let response = send(&app, json_request(Method::POST, TODOS, json!({ "title": "   " }))).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let error = body_json(response).await;
    assert_eq!(error["code"], "VALIDATION_FAILED");
    assert_eq!(error["error"], "Title is required and cannot be empty");

    let listed = body_json(send(&app, empty_request(Method::GET, TODOS)).await).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = build_test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri(TODOS)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_todo_is_not_found_everywhere() {
    let app = build_test_app();
    let missing = format!("{TODOS}/01hqzx3y9f8g7jtrqwknxvp123");

    let get = send(&app, empty_request(Method::GET, &missing)).await;
    assert_eq!(get.status(), StatusCode::NOT_FOUND);

    let put = send(&app, json_request(Method::PUT, &missing, json!({ "title": "x" }))).await;
    assert_eq!(put.status(), StatusCode::NOT_FOUND);

    let toggle = send(&app, empty_request(Method::PATCH, &format!("{missing}/toggle"))).await;
    assert_eq!(toggle.status(), StatusCode::NOT_FOUND);

    let delete = send(&app, empty_request(Method::DELETE, &missing)).await;
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unparseable_id_is_not_found() {
    let app = build_test_app();

    let response = send(&app, empty_request(Method::GET, &format!("{TODOS}/42"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["entity_id"], "42");
}

#[tokio::test]
async fn test_delete_is_terminal() {
    let app = build_test_app();
    let created = create_todo(&app, "Once").await;
    let item = format!("{TODOS}/{}", created["id"].as_str().unwrap());

    assert_eq!(
        send(&app, empty_request(Method::DELETE, &item)).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        send(&app, empty_request(Method::DELETE, &item)).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_request_id_is_set_and_propagated() {
    let app = build_test_app();

    let generated = send(&app, empty_request(Method::GET, TODOS)).await;
    let id = generated.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert!(id.starts_with("req_"));

    let request = Request::builder()
        .uri(TODOS)
        .header("x-request-id", "req_01h455vb4pex5vsknk084sn02q")
        .body(Body::empty())
        .unwrap();
    let echoed = send(&app, request).await;
    assert_eq!(
        echoed.headers().get("x-request-id").unwrap(),
        "req_01h455vb4pex5vsknk084sn02q"
    );
}
