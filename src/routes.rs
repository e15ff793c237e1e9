//! HTTP surface: one handler per route, each issuing a single store call.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | /health | `health` |
//! | GET | /todos | `list_todos` |
//! | POST | /todos | `create_todo` |
//! | GET | /todos/:id | `get_todo` |
//! | PUT | /todos/:id | `update_todo` |
//! | PATCH | /todos/:id | `toggle_todo` |
//! | DELETE | /todos/:id | `delete_todo` |

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::ConfigError,
    error::ApiError,
    models::{Todo, TodoId, TodoText},
    repository::TodoStore,
};

// === App State ===
pub struct AppState<S> {
    store: Arc<S>,
}
impl<S> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

/// Routes only, without CORS or tracing.
pub fn router<S: TodoStore>(store: S) -> Router {
    Router::new()
        .route("/health", get(health::<S>))
        .route("/todos", get(list_todos::<S>).post(create_todo::<S>))
        .route(
            "/todos/:id",
            get(get_todo::<S>)
                .put(update_todo::<S>)
                .patch(toggle_todo::<S>)
                .delete(delete_todo::<S>),
        )
        .with_state(AppState::new(store))
}

/// The full service: routes plus the browser CORS policy and request tracing.
pub fn app<S: TodoStore>(store: S, allowed_origins: &[String]) -> Result<Router, ConfigError> {
    Ok(router(store)
        .layer(cors(allowed_origins)?)
        .layer(TraceLayer::new_for_http()))
}

pub fn cors(allowed_origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            let invalid = || ConfigError::Invalid {
                key: "CORS_ALLOWED_ORIGINS",
                value: origin.clone(),
            };
            // credentials are allowed, so a wildcard origin is never valid
            if origin == "*" {
                return Err(invalid());
            }
            HeaderValue::from_str(origin).map_err(|_| invalid())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(Duration::from_secs(12 * 60 * 60)))
}

// === Routes ===
// a segment that is not even UTF-8 is reported the same as a non-numeric one
fn todo_id(path: Result<Path<String>, PathRejection>) -> Result<TodoId, ApiError> {
    let Path(raw) = path?;
    Ok(raw.parse()?)
}

async fn health<S: TodoStore>(State(state): State<AppState<S>>) -> (StatusCode, Json<Value>) {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "error", "message": "database not responding" })),
            )
        }
    }
}

async fn list_todos<S: TodoStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state
        .store
        .list()
        .await
        .map_err(ApiError::store("Failed to fetch todos"))?;
    Ok(Json(todos))
}

async fn get_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(id)?;
    state
        .store
        .get(id)
        .await
        .map_err(ApiError::store("Failed to fetch todo"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn create_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    body: Result<Json<TodoText>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let Json(TodoText { text }) = body?;
    let todo = state
        .store
        .create(&text)
        .await
        .map_err(ApiError::store("Failed to create todo"))?;
    tracing::debug!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

// the id is checked before the body
async fn update_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<TodoText>, JsonRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(id)?;
    let Json(TodoText { text }) = body?;
    state
        .store
        .update_text(id, &text)
        .await
        .map_err(ApiError::store("Failed to update todo"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn toggle_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(id)?;
    state
        .store
        .toggle(id)
        .await
        .map_err(ApiError::store("Failed to toggle todo"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn delete_todo<S: TodoStore>(
    State(state): State<AppState<S>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = todo_id(id)?;
    let deleted = state
        .store
        .delete(id)
        .await
        .map_err(ApiError::store("Failed to delete todo"))?;
    if !deleted {
        return Err(ApiError::NotFound);
    }
    tracing::debug!(%id, "deleted todo");
    Ok(Json(json!({ "message": "Todo deleted successfully" })))
}
