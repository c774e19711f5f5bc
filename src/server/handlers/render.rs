//! Single-certificate render handler.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::render;

use super::super::state::AppState;

/// Handle POST /api/render/:id - render one recipient's certificate and
/// return it as a PNG download with a randomized filename.
pub async fn render(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let registry = state.registry.read().await;
    let recipient = {
        let store = state.store.read().await;
        match store.get(&id) {
            Some(r) => r.clone(),
            None => {
                return (StatusCode::NOT_FOUND, format!("unknown recipient {}", id))
                    .into_response();
            }
        }
    };

    match render::render_recipient(&state.compositor, &registry, &state.backgrounds, &recipient)
        .await
    {
        Ok(cert) => (
            [
                (header::CONTENT_TYPE, "image/png".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", cert.file_name),
                ),
            ],
            cert.png,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Render failed: {}", e),
        )
            .into_response(),
    }
}
