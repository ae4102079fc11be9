//! Request handlers and server lifecycle for the Tasks API.

use axum::{
    Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::query::{self, ListParams, TaskPage};
use crate::store::TaskStore;
use crate::types::{Task, next_id};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backing store for the task collection.
    store: Arc<dyn TaskStore>,
    /// Serializes the load-mutate-save window of mutating handlers within
    /// this process. Cross-process writers still race (last write wins).
    write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Root endpoint - plain-text greeting.
async fn root() -> &'static str {
    "Tasks API up"
}

/// Health check endpoint.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /tasks` - list tasks through the query pipeline.
async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<TaskPage>> {
    let tasks = state.store.load();
    Ok(Json(query::run(&params, tasks)?))
}

/// `GET /tasks/{id}` - fetch a single task.
async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    let task = state
        .store
        .load()
        .into_iter()
        .find(|t| t.id == id)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(task))
}

/// `POST /tasks` - create a task from `{"title": ...}`.
async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let body = json_body(body)?;
    let title = body
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::validation("title is required (non-empty string)"))?
        .to_string();

    let _guard = state.write_lock.lock().unwrap();
    let mut tasks = state.store.load();
    let task = Task::new(next_id(&tasks), title);
    tasks.push(task.clone());
    state.store.save(&tasks)?;

    info!(id = task.id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PATCH /tasks/{id}` - partial update of `title` and/or `done`.
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let id = parse_id(&id)?;
    let body = json_body(body)?;

    // Validate the whole body before touching the store; a partially
    // applied patch must never be persisted.
    let title = match body.get("title") {
        None => None,
        Some(value) => Some(
            value
                .as_str()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    ApiError::validation("title must be non-empty string when provided")
                })?
                .to_string(),
        ),
    };
    let done = match body.get("done") {
        None => None,
        Some(value) => Some(
            value
                .as_bool()
                .ok_or_else(|| ApiError::validation("done must be boolean when provided"))?,
        ),
    };

    let _guard = state.write_lock.lock().unwrap();
    let mut tasks = state.store.load();
    let task = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(ApiError::NotFound)?;
    if let Some(title) = title {
        task.title = title;
    }
    if let Some(done) = done {
        task.done = done;
    }
    let task = task.clone();
    state.store.save(&tasks)?;

    Ok(Json(task))
}

/// `DELETE /tasks/{id}` - remove a task, preserving survivor order.
async fn delete_task(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;

    let _guard = state.write_lock.lock().unwrap();
    let mut tasks = state.store.load();
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    if tasks.len() == before {
        return Err(ApiError::NotFound);
    }
    state.store.save(&tasks)?;

    info!(id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Fallback for unmatched routes.
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}

/// Parse a path id segment.
fn parse_id(raw: &str) -> ApiResult<u64> {
    raw.parse().map_err(|_| ApiError::validation("invalid id"))
}

/// Decode an optional JSON body.
///
/// A request without a JSON body acts as an empty object (so a body-less
/// PATCH is a no-op update); syntactically invalid JSON is a validation
/// error rather than a bare rejection.
fn json_body(body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(json!({})),
        Err(rejection) => Err(ApiError::validation(rejection.body_text())),
    }
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    // Permissive CORS for local tooling
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).patch(update_task).delete(delete_task),
        )
        .route("/health", get(health))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the specified port.
///
/// Returns a oneshot sender that can be used to signal shutdown,
/// and the actual address the server is bound to.
pub async fn start_server(
    store: Arc<dyn TaskStore>,
    port: u16,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let app = build_router(AppState::new(store));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Tasks API listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}
