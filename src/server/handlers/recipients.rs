//! Recipient administration and the import pipeline endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::import::{self, RawRow};
use crate::model::{PlaceholderOverride, Recipient};

use super::super::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub search: Option<String>,
}

/// Handle GET /api/recipients - administrative listing, optionally
/// filtered. Disabled recipients are included.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Recipient>> {
    let store = state.store.read().await;
    let hits: Vec<Recipient> = store
        .search(params.search.as_deref().unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    Json(hits)
}

#[derive(Debug, Deserialize)]
pub struct EnabledBody {
    pub enabled: bool,
}

/// Handle PUT /api/recipients/:id/enabled - toggle public visibility.
pub async fn set_enabled(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<EnabledBody>,
) -> Response {
    let mut store = state.store.write().await;
    if store.set_enabled(&id, body.enabled) {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, format!("unknown recipient {}", id)).into_response()
    }
}

/// Handle PUT /api/recipients/:id/overrides/:key - set one placeholder
/// override. An empty body clears it instead of storing a no-op.
pub async fn set_override(
    State(state): State<Arc<AppState>>,
    Path((id, key)): Path<(String, String)>,
    Json(ov): Json<PlaceholderOverride>,
) -> Response {
    let mut store = state.store.write().await;
    let found = if ov.is_empty() {
        let known = store.get(&id).is_some();
        if known {
            store.clear_override(&id, &key);
        }
        known
    } else {
        store.set_override(&id, key, ov)
    };
    if found {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, format!("unknown recipient {}", id)).into_response()
    }
}

/// Handle DELETE /api/recipients/:id/overrides/:key - remove an override,
/// restoring the template default at the next render.
pub async fn clear_override(
    State(state): State<Arc<AppState>>,
    Path((id, key)): Path<(String, String)>,
) -> Response {
    let mut store = state.store.write().await;
    if store.get(&id).is_none() {
        return (StatusCode::NOT_FOUND, format!("unknown recipient {}", id)).into_response();
    }
    store.clear_override(&id, &key);
    StatusCode::NO_CONTENT.into_response()
}

/// Handle POST /api/import/validate - validate an uploaded batch of rows.
///
/// Returns the full error list; nothing is committed yet.
pub async fn validate_import(
    State(state): State<Arc<AppState>>,
    Json(rows): Json<Vec<RawRow>>,
) -> Response {
    let mut session = state.import.lock().await;
    let token = session.begin();
    let registry = state.registry.read().await;
    let summary = import::validate_rows(&rows, &registry);
    session.deliver(token, summary.clone());
    Json(summary).into_response()
}

#[derive(Debug, Serialize)]
pub struct ConfirmBody {
    pub imported: usize,
}

/// Handle POST /api/import/confirm - commit the valid rows of the last
/// validation. All-or-nothing; a duplicate certificate number fails the
/// whole commit.
pub async fn confirm_import(State(state): State<Arc<AppState>>) -> Response {
    let mut session = state.import.lock().await;
    let mut store = state.store.write().await;
    match session.confirm(&mut store) {
        Ok(imported) => (StatusCode::OK, Json(ConfirmBody { imported })).into_response(),
        Err(e) => (StatusCode::CONFLICT, e.to_string()).into_response(),
    }
}

/// Handle POST /api/import/close - dismiss the import dialog; any
/// in-flight validation result becomes stale.
pub async fn close_import(State(state): State<Arc<AppState>>) -> StatusCode {
    state.import.lock().await.close();
    StatusCode::NO_CONTENT
}
