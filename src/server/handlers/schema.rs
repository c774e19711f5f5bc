//! Template listing and placeholder schema export/import.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::model::Template;
use crate::schema_io;

use super::super::state::AppState;

/// Handle GET /api/templates - list registered templates.
pub async fn templates(State(state): State<Arc<AppState>>) -> Json<Vec<Template>> {
    let registry = state.registry.read().await;
    Json(registry.templates().to_vec())
}

/// Handle GET /api/templates/:code/schema - export a schema as JSON.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Response {
    let registry = state.registry.read().await;
    if registry.template(&code).is_none() {
        return (StatusCode::NOT_FOUND, format!("unknown template code {}", code)).into_response();
    }
    match schema_io::export_schema(registry.schema(&code)) {
        Ok(json) => ([(header::CONTENT_TYPE, "application/json")], json).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

/// Handle PUT /api/templates/:code/schema - replace a schema from a JSON
/// document. Malformed documents and duplicate keys are rejected without
/// touching the current schema.
pub async fn import(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    body: String,
) -> Response {
    let schema = match schema_io::import_schema(&body) {
        Ok(schema) => schema,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let mut registry = state.registry.write().await;
    match registry.set_schema(&code, schema) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => (StatusCode::NOT_FOUND, e.to_string()).into_response(),
    }
}
