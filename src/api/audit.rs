use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::error::domain_error;
use crate::domain::{Actor, AuditFilter};
use crate::infrastructure::AppState;
use crate::services::audit_service;

// Audit trail, newest first, optionally filtered by record or action
pub async fn list_audit_log(
    _actor: Actor,
    State(state): State<AppState>,
    Query(filter): Query<AuditFilter>,
) -> Response {
    match audit_service::list_entries(state.audit_repo.as_ref(), filter).await {
        Ok(entries) => Json(json!({
            "total": entries.len(),
            "entries": entries
        }))
        .into_response(),
        Err(e) => domain_error(e, "Audit entry"),
    }
}
