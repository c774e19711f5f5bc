//! Bulk generation handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::bulk::BulkState;
use crate::render;

use super::super::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateRequest {
    /// Explicit selection; empty falls back to the filtered view.
    pub ids: Vec<String>,
    /// The admin table's current search filter.
    pub search: Option<String>,
}

/// Handle POST /api/bulk/generate - run one batch to completion.
///
/// A second request while a batch is in flight gets 409 without touching
/// any state.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GenerateRequest>,
) -> Response {
    let Ok(mut bulk) = state.bulk.try_lock() else {
        return (StatusCode::CONFLICT, "a batch is already running".to_string()).into_response();
    };

    // Lock order: registry before store. The batch can spend a long time on
    // background fetches, so take a registry snapshot and release that lock
    // before the run; only the store stays locked for the batch.
    let registry = state.registry.read().await.clone();
    let mut store = state.store.write().await;
    let filtered: Vec<String> = store
        .search(req.search.as_deref().unwrap_or(""))
        .into_iter()
        .map(|r| r.id.clone())
        .collect();

    let registry_ref = &registry;
    let compositor = &state.compositor;
    let backgrounds = &state.backgrounds;
    let result = bulk
        .run(&req.ids, &filtered, &mut store, |recipient| async move {
            render::render_recipient(compositor, registry_ref, backgrounds, &recipient)
                .await
                .map(|_| ())
        })
        .await;

    match result {
        Ok(report) => Json(report).into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressBody {
    pub progress: u8,
    pub state: &'static str,
}

/// Handle GET /api/bulk/progress - current percentage and batch state.
///
/// Progress comes from the watch channel so this never waits on a running
/// batch.
pub async fn progress(State(state): State<Arc<AppState>>) -> Json<ProgressBody> {
    let progress = *state.bulk_progress.borrow();
    let stage = match state.bulk.try_lock() {
        Ok(bulk) => match bulk.state() {
            BulkState::Idle => "idle",
            BulkState::Running { .. } => "running",
            BulkState::Completed => "completed",
        },
        // The generate handler holds the lock for the whole batch
        Err(_) => "running",
    };
    Json(ProgressBody {
        progress,
        state: stage,
    })
}
