use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use todo_api::server::{router, AppState};
use todo_api::SqliteStore;
use tower::ServiceExt;

fn app() -> Router {
    router(Arc::new(AppState::new(Arc::new(SqliteStore::open_in_memory()))))
}

fn app_at(path: &Path) -> (Router, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open(path));
    (router(Arc::new(AppState::new(store.clone()))), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router, body: Value) -> Value {
    let (status, todo) = send(app, Method::POST, "/todos", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    todo
}

#[tokio::test]
async fn health_and_welcome() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("message").is_some());
}

#[tokio::test]
async fn create_with_title_only() {
    let app = app();
    let todo = create(&app, json!({ "title": "Buy milk" })).await;

    assert_eq!(
        todo,
        json!({ "id": 1, "title": "Buy milk", "description": null, "status": "pending" })
    );
}

#[tokio::test]
async fn create_with_all_fields() {
    let app = app();
    let todo = create(
        &app,
        json!({ "title": "Full task", "description": "A description", "status": "done" }),
    )
    .await;

    assert_eq!(todo["description"], "A description");
    assert_eq!(todo["status"], "done");
}

#[tokio::test]
async fn create_without_title_is_422() {
    let app = app();

    for body in [
        json!({}),
        json!({ "title": "" }),
        json!({ "title": null, "description": "d", "status": "done" }),
    ] {
        let (status, detail) = send(&app, Method::POST, "/todos", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(detail, json!({ "detail": "title is required" }));
    }

    let (_, todos) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(todos, json!([]));
}

#[tokio::test]
async fn create_without_body_is_422() {
    let app = app();

    let (status, detail) = send(&app, Method::POST, "/todos", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(detail, json!({ "detail": "title is required" }));

    let (_, todos) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(todos, json!([]));
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/todos")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (_, todos) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(todos, json!([]));
}

#[tokio::test]
async fn list_empty_store() {
    let (status, body) = send(&app(), Method::GET, "/todos", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_paginates() {
    let app = app();
    for title in ["Todo A", "Todo B", "Todo C"] {
        create(&app, json!({ "title": title })).await;
    }

    let (status, body) = send(&app, Method::GET, "/todos?skip=1&limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Todo B");

    let (_, body) = send(&app, Method::GET, "/todos?skip=3", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_defaults_to_ten_and_ignores_malformed_values() {
    let app = app();
    for i in 0..12 {
        create(&app, json!({ "title": format!("Todo {i}") })).await;
    }

    let (_, body) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(body.as_array().unwrap().len(), 10);

    let (status, body) = send(&app, Method::GET, "/todos?skip=abc&limit=xyz", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["title"], "Todo 0");
}

#[tokio::test]
async fn get_round_trip_and_missing() {
    let app = app();
    let created = create(&app, json!({ "title": "Find me" })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, Method::GET, &format!("/todos/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    for uri in ["/todos/9999", "/todos/not-a-number"] {
        let (status, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "Todo not found" }));
    }
}

#[tokio::test]
async fn update_is_partial() {
    let app = app();
    let created = create(&app, json!({ "title": "Original", "description": "keep" })).await;
    let uri = format!("/todos/{}", created["id"]);

    let (status, updated) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "title": "Renamed", "status": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["description"], "keep");
    assert_eq!(updated["status"], "done");

    let (_, updated) = send(&app, Method::PUT, &uri, Some(json!({ "description": "" }))).await;
    assert_eq!(updated["description"], "");
    assert_eq!(updated["title"], "Renamed");
}

#[tokio::test]
async fn update_without_body_changes_nothing() {
    let app = app();
    let created = create(&app, json!({ "title": "Steady", "description": "as before" })).await;
    let uri = format!("/todos/{}", created["id"]);

    let (status, updated) = send(&app, Method::PUT, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, created);

    let (status, _) = send(&app, Method::PUT, "/todos/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_missing_is_404() {
    let (status, body) = send(
        &app(),
        Method::PUT,
        "/todos/999",
        Some(json!({ "title": "x" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Todo not found" }));
}

#[tokio::test]
async fn delete_then_gone() {
    let app = app();
    let created = create(&app, json!({ "title": "Delete me" })).await;
    let uri = format!("/todos/{}", created["id"]);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "detail": "Todo deleted" }));

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, todos) = send(&app, Method::GET, "/todos", None).await;
    assert_eq!(todos, json!([]));
}

#[tokio::test]
async fn search_matches_literal_substrings() {
    let app = app();
    let quoted = create(&app, json!({ "title": "Test's \"quote\"" })).await;
    create(&app, json!({ "title": "Unrelated" })).await;

    let (status, body) = send(&app, Method::GET, "/todos/search/all?q=quote", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([quoted]));

    // ' OR 1=1 --
    let (status, body) = send(
        &app,
        Method::GET,
        "/todos/search/all?q=%27%20OR%201%3D1%20--",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (_, body) = send(&app, Method::GET, "/todos/search/all", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn data_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.db");

    let (app, store) = app_at(&path);
    create(&app, json!({ "title": "Persisted" })).await;
    let doomed = create(&app, json!({ "title": "Deleted" })).await;
    send(&app, Method::DELETE, &format!("/todos/{}", doomed["id"]), None).await;
    store.close().unwrap();

    let (app, _store) = app_at(&path);
    let (_, todos) = send(&app, Method::GET, "/todos", None).await;
    let todos = todos.as_array().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0]["title"], "Persisted");

    let next = create(&app, json!({ "title": "After restart" })).await;
    assert_eq!(next["id"], 3);
}
