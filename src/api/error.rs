//! Mapping of service errors onto `(StatusCode, Json)` responses.
//!
//! Bodies are always `{"error": ..., "details": ...}` with `details` omitted
//! when there is nothing to add.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::DomainError;
use crate::services::MergeError;

pub fn error_response(status: StatusCode, error: &str, details: Option<String>) -> Response {
    let body = match details {
        Some(details) => json!({ "error": error, "details": details }),
        None => json!({ "error": error }),
    };
    (status, Json(body)).into_response()
}

/// `resource` names what was looked up, e.g. "Guest" gives "Guest not found".
pub fn domain_error(e: DomainError, resource: &str) -> Response {
    match &e {
        DomainError::NotFound => error_response(
            StatusCode::NOT_FOUND,
            &format!("{} not found", resource),
            None,
        ),
        DomainError::Validation(msg) => {
            error_response(StatusCode::BAD_REQUEST, "Validation error", Some(msg.clone()))
        }
        DomainError::Conflict(msg) => error_response(StatusCode::CONFLICT, msg, None),
        DomainError::Database(_) | DomainError::Internal(_) => {
            tracing::error!("{} request failed: {}", resource, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(e.to_string()),
            )
        }
    }
}

pub fn merge_status(e: &MergeError) -> StatusCode {
    match e {
        MergeError::Unauthorized => StatusCode::UNAUTHORIZED,
        MergeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        MergeError::NotFound(_) => StatusCode::NOT_FOUND,
        MergeError::MutationFailure { .. } | MergeError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn merge_error(e: MergeError) -> Response {
    error_response(merge_status(&e), &e.to_string(), e.details())
}
