//! Public certificate query handler.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::QueryError;
use crate::model::{Recipient, Template};

use super::super::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub name: String,
    pub phone: String,
    pub org_id: String,
}

/// A successful lookup: the record plus the template to render it with.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub recipient: Recipient,
    pub template: Template,
}

#[derive(Debug, Serialize)]
pub struct QueryErrorBody {
    pub error: QueryError,
    pub message: String,
}

/// Handle POST /api/query - look up a certificate by the exact
/// (name, phone, organization) triple.
///
/// Any mismatch is a 404 with a generic message; a match on a disabled
/// record is a 403. The response never says which field was wrong. A hit
/// whose template code the registry no longer knows is a configuration
/// error, reported as such rather than answered with a half-usable body.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Response {
    // Lock order: registry before store, everywhere.
    let registry = state.registry.read().await;
    let store = state.store.read().await;
    match store.query(req.name.trim(), req.phone.trim(), req.org_id.trim()) {
        Ok(recipient) => match registry.template_for(recipient) {
            Ok(template) => (
                StatusCode::OK,
                Json(QueryResponse {
                    recipient: recipient.clone(),
                    template: template.clone(),
                }),
            )
                .into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        },
        Err(e) => {
            let status = match e {
                QueryError::NotFound => StatusCode::NOT_FOUND,
                QueryError::Disabled => StatusCode::FORBIDDEN,
            };
            (
                status,
                Json(QueryErrorBody {
                    error: e,
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
