//! Room API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::domain_error;
use crate::domain::{Actor, RoomInput, UpdateRoomInput};
use crate::infrastructure::AppState;
use crate::services::room_service;

#[derive(Debug, Deserialize)]
pub struct RoomsQuery {
    #[serde(default)]
    pub active_only: bool,
}

pub async fn list_rooms(
    _actor: Actor,
    State(state): State<AppState>,
    Query(params): Query<RoomsQuery>,
) -> Response {
    match room_service::list_rooms(state.room_repo.as_ref(), params.active_only).await {
        Ok(rooms) => Json(json!({
            "total": rooms.len(),
            "rooms": rooms
        }))
        .into_response(),
        Err(e) => domain_error(e, "Room"),
    }
}

pub async fn get_room(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match room_service::get_room(state.room_repo.as_ref(), &id).await {
        Ok(room) => Json(json!({ "room": room })).into_response(),
        Err(e) => domain_error(e, "Room"),
    }
}

pub async fn create_room(
    _actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<RoomInput>,
) -> Response {
    match room_service::create_room(state.room_repo.as_ref(), payload).await {
        Ok(room) => (
            StatusCode::CREATED,
            Json(json!({
                "room": room,
                "message": "Room created successfully"
            })),
        )
            .into_response(),
        Err(e) => domain_error(e, "Room"),
    }
}

pub async fn update_room(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRoomInput>,
) -> Response {
    match room_service::update_room(state.room_repo.as_ref(), &id, payload).await {
        Ok(room) => Json(json!({
            "room": room,
            "message": "Room updated successfully"
        }))
        .into_response(),
        Err(e) => domain_error(e, "Room"),
    }
}

pub async fn delete_room(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match room_service::delete_room(
        state.room_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &id,
    )
    .await
    {
        Ok(()) => Json(json!({ "message": "Room deleted successfully" })).into_response(),
        Err(e) => domain_error(e, "Room"),
    }
}
