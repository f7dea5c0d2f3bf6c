use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::server::AppState;
use crate::service::{Page, TodoService};
use crate::todo::{NewTodo, Todo, TodoPatch};
use crate::Error;

/// Raw pagination values; parsed leniently by [`Page::from_query`].
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// `{"detail": ...}` body used for errors and delete confirmations.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Error returned by the handlers, rendered as a status plus [`Detail`].
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Todo not found")
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(message) => Self::new(StatusCode::UNPROCESSABLE_ENTITY, message),
            Error::NotFound(_) => Self::not_found(),
            other => {
                tracing::error!("Request failed: {}", other);
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Detail::new(self.detail))).into_response()
    }
}

/// Run a service call on the blocking pool; SQLite calls and the persist
/// step both block.
async fn run<T, F>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&TodoService) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| {
            tracing::error!("Blocking task failed: {}", e);
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}

/// Malformed ids are reported exactly like missing ones.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found())
}

/// A request without a JSON content type (a body-less POST or PUT) is read
/// as an empty object; every other rejection is reported as-is.
fn body_or_default<T: Default>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(rejection.into()),
    }
}

pub async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Welcome to the todo API" }))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn create_todo(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let input = body_or_default(payload)?;
    let todo = run(&state, move |service| service.create(input)).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn list_todos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let page = Page::from_query(params.skip.as_deref(), params.limit.as_deref());
    let todos = run(&state, move |service| service.list(page)).await?;
    Ok(Json(todos))
}

pub async fn get_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let todo = run(&state, move |service| service.get(id)).await?;
    Ok(Json(todo))
}

pub async fn update_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_id(&id)?;
    let patch = body_or_default(payload)?;
    let todo = run(&state, move |service| service.update(id, patch)).await?;
    Ok(Json(todo))
}

pub async fn delete_todo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Detail>, ApiError> {
    let id = parse_id(&id)?;
    run(&state, move |service| service.delete(id)).await?;
    Ok(Json(Detail::new("Todo deleted")))
}

pub async fn search_todos(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let query = params.q.unwrap_or_default();
    let todos = run(&state, move |service| service.search(&query)).await?;
    Ok(Json(todos))
}
