//! Axum route handlers for the memory store HTTP API.

use crate::db::{Db, ListFilter, StoreResult};
use crate::error::ApiError;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::{delete, get, post};
use memory_store_types::*;
use std::sync::Arc;
use std::time::Instant;

pub struct AppState {
    pub db: Arc<Db>,
    pub start_time: Instant,
    pub default_limit: u32,
}

impl AppState {
    pub fn new(db: Arc<Db>, default_limit: u32) -> Self {
        Self {
            db,
            start_time: Instant::now(),
            default_limit,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = tower_http::cors::CorsLayer::permissive();

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/memory", post(create_memory).get(list_memory))
        .route("/memory/:id", delete(delete_memory))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
}

/// Run a store operation on the blocking pool.
async fn with_db<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    F: FnOnce(&Db) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let db = state.db.clone();
    tokio::task::spawn_blocking(move || op(&db))
        .await
        .map_err(|e| {
            log::error!("Store task failed: {}", e);
            ApiError::internal()
        })?
        .map_err(ApiError::from)
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Empty query parameters count as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

// GET /status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<ServiceStatus> {
    let total_records = with_db(&state, |db| db.count()).await.unwrap_or(0);
    Json(ServiceStatus {
        running: true,
        uptime_secs: state.start_time.elapsed().as_secs(),
        total_records,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// POST /memory
pub async fn create_memory(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateMemoryRequest>, JsonRejection>,
) -> Result<Json<MemoryRecord>, ApiError> {
    let Json(req) = payload?;
    require("user_id", &req.user_id)?;
    require("key", &req.key)?;
    if req.value.is_empty() {
        return Err(ApiError::validation("value must not be empty"));
    }

    let record = with_db(&state, move |db| {
        db.insert(&req.user_id, &req.key, &req.value, req.tags.as_deref())
    })
    .await?;
    Ok(Json(record))
}

// GET /memory?user_id=&key=&tag=&limit=
pub async fn list_memory(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListMemoryQuery>, QueryRejection>,
) -> Result<Json<Vec<MemoryRecord>>, ApiError> {
    let Query(query) = query?;
    let user_id = query
        .user_id
        .ok_or_else(|| ApiError::validation("user_id is required"))?;
    require("user_id", &user_id)?;

    let key = non_empty(query.key);
    let tag = non_empty(query.tag);
    let limit = query.limit.unwrap_or(state.default_limit);

    let records = with_db(&state, move |db| {
        db.list(&ListFilter {
            user_id: &user_id,
            key: key.as_deref(),
            tag: tag.as_deref(),
            limit,
        })
    })
    .await?;
    Ok(Json(records))
}

// DELETE /memory/:id
pub async fn delete_memory(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteMemoryResponse>, ApiError> {
    let Path(id) = id?;
    let id = with_db(&state, move |db| db.delete(id)).await?;
    Ok(Json(DeleteMemoryResponse { deleted: true, id }))
}
