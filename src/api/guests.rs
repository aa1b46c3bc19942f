//! Guest API handlers, including the merge endpoint

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::api::error::{domain_error, error_response, merge_error};
use crate::domain::{Actor, GuestFields, UpdateGuestInput};
use crate::infrastructure::AppState;
use crate::services::guest_service;
use crate::services::merge_service::{MergeRequest, MergedFieldsInput};

#[derive(Debug, Deserialize)]
pub struct CreateGuestRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Field values the surviving guest should end up with
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MergedFieldsPayload {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl From<MergedFieldsPayload> for MergedFieldsInput {
    fn from(payload: MergedFieldsPayload) -> Self {
        Self {
            full_name: payload.full_name,
            email: payload.email,
            phone_number: payload.phone_number,
            address: payload.address,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeGuestsRequest {
    pub target_guest_id: Option<String>,
    pub source_guest_id: Option<String>,
    #[serde(alias = "mergedData")]
    pub merged_fields: Option<MergedFieldsPayload>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MergedGuestFields {
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl From<GuestFields> for MergedGuestFields {
    fn from(fields: GuestFields) -> Self {
        Self {
            full_name: fields.full_name,
            email: fields.email,
            phone_number: fields.phone_number,
            address: fields.address,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MergeGuestsResponse {
    pub success: bool,
    pub message: String,
    pub target_guest_id: String,
    pub merged_fields: MergedGuestFields,
    pub reassigned_reservations: u64,
}

#[utoipa::path(
    get,
    path = "/api/guests",
    responses(
        (status = 200, description = "All guests ordered by name"),
        (status = 401, description = "Missing or invalid bearer token")
    ),
    security(("bearer" = []))
)]
pub async fn list_guests(_actor: Actor, State(state): State<AppState>) -> Response {
    match guest_service::list_guests(state.guest_repo.as_ref()).await {
        Ok(guests) => Json(json!({
            "total": guests.len(),
            "guests": guests
        }))
        .into_response(),
        Err(e) => domain_error(e, "Guest"),
    }
}

pub async fn search_guests(
    _actor: Actor,
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Response {
    match guest_service::search_guests(state.guest_repo.as_ref(), &params.q).await {
        Ok(guests) => Json(json!({ "guests": guests })).into_response(),
        Err(e) => domain_error(e, "Guest"),
    }
}

#[utoipa::path(
    get,
    path = "/api/guests/duplicates",
    responses(
        (status = 200, description = "Groups of guests that are likely the same person")
    ),
    security(("bearer" = []))
)]
pub async fn find_duplicates(_actor: Actor, State(state): State<AppState>) -> Response {
    match guest_service::find_duplicates(state.guest_repo.as_ref()).await {
        Ok(duplicates) => Json(json!({ "duplicates": duplicates })).into_response(),
        Err(e) => domain_error(e, "Guest"),
    }
}

pub async fn get_guest(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match guest_service::get_guest(state.guest_repo.as_ref(), &id).await {
        Ok(guest) => Json(json!({ "guest": guest })).into_response(),
        Err(e) => domain_error(e, "Guest"),
    }
}

pub async fn create_guest(
    _actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<CreateGuestRequest>,
) -> Response {
    let fields = GuestFields {
        full_name: payload.full_name,
        email: payload.email,
        phone_number: payload.phone_number,
        address: payload.address,
    };

    match guest_service::create_guest(state.guest_repo.as_ref(), fields).await {
        Ok(guest) => (
            StatusCode::CREATED,
            Json(json!({
                "guest": guest,
                "message": "Guest created successfully"
            })),
        )
            .into_response(),
        Err(e) => domain_error(e, "Guest"),
    }
}

pub async fn update_guest(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateGuestInput>,
) -> Response {
    match guest_service::update_guest(state.guest_repo.as_ref(), &id, payload).await {
        Ok(guest) => Json(json!({
            "guest": guest,
            "message": "Guest updated successfully"
        }))
        .into_response(),
        Err(e) => domain_error(e, "Guest"),
    }
}

pub async fn delete_guest(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match guest_service::delete_guest(
        state.guest_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &id,
    )
    .await
    {
        Ok(()) => Json(json!({ "message": "Guest deleted successfully" })).into_response(),
        Err(e) => domain_error(e, "Guest"),
    }
}

/// Merge a duplicate guest into the one that survives
#[utoipa::path(
    post,
    path = "/api/guests/merge",
    request_body = MergeGuestsRequest,
    responses(
        (status = 200, description = "Guests merged", body = MergeGuestsResponse),
        (status = 400, description = "Missing fields, invalid fields or self-merge"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 404, description = "Source or target guest not found"),
        (status = 500, description = "A merge step failed")
    ),
    security(("bearer" = []))
)]
pub async fn merge_guests(
    actor: Actor,
    State(state): State<AppState>,
    payload: Result<Json<MergeGuestsRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid request body",
                Some(e.body_text()),
            );
        }
    };

    let request = MergeRequest {
        target_guest_id: payload.target_guest_id.unwrap_or_default(),
        source_guest_id: payload.source_guest_id.unwrap_or_default(),
        merged_fields: payload.merged_fields.map(MergedFieldsInput::from),
    };

    match state.guest_merger().merge(&actor, request).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(MergeGuestsResponse {
                success: true,
                message: "Guests merged successfully".to_string(),
                target_guest_id: outcome.target_guest_id,
                merged_fields: outcome.merged_fields.into(),
                reassigned_reservations: outcome.reassigned_reservations,
            }),
        )
            .into_response(),
        Err(e) => merge_error(e),
    }
}
