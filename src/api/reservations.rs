//! Reservation and payment API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::api::error::domain_error;
use crate::domain::{Actor, NewPayment, ReservationInput, UpdateReservationInput};
use crate::infrastructure::AppState;
use crate::services::reservation_service::{self, ReservationDeps};
use crate::services::payment_service;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    pub amount: f64,
    pub payment_date: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

fn deps(state: &AppState) -> ReservationDeps<'_> {
    ReservationDeps {
        guests: state.guest_repo.as_ref(),
        rooms: state.room_repo.as_ref(),
        reservations: state.reservation_repo.as_ref(),
    }
}

pub async fn list_reservations(_actor: Actor, State(state): State<AppState>) -> Response {
    match reservation_service::list_reservations(state.reservation_repo.as_ref()).await {
        Ok(reservations) => Json(json!({
            "total": reservations.len(),
            "reservations": reservations
        }))
        .into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}

pub async fn list_reservations_in_range(
    _actor: Actor,
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Response {
    match reservation_service::list_reservations_in_range(
        state.reservation_repo.as_ref(),
        &range.from,
        &range.to,
    )
    .await
    {
        Ok(reservations) => Json(json!({ "reservations": reservations })).into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}

pub async fn get_reservation(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match reservation_service::get_reservation(state.reservation_repo.as_ref(), &id).await {
        Ok(reservation) => Json(json!({ "reservation": reservation })).into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}

pub async fn create_reservation(
    _actor: Actor,
    State(state): State<AppState>,
    Json(payload): Json<ReservationInput>,
) -> Response {
    match reservation_service::create_reservation(deps(&state), payload).await {
        Ok(reservation) => (
            StatusCode::CREATED,
            Json(json!({
                "reservation": reservation,
                "message": "Reservation created successfully"
            })),
        )
            .into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}

pub async fn update_reservation(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReservationInput>,
) -> Response {
    match reservation_service::update_reservation(deps(&state), &id, payload).await {
        Ok(reservation) => Json(json!({
            "reservation": reservation,
            "message": "Reservation updated successfully"
        }))
        .into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}

pub async fn delete_reservation(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match reservation_service::delete_reservation(
        state.reservation_repo.as_ref(),
        state.payment_repo.as_ref(),
        &id,
    )
    .await
    {
        Ok(()) => Json(json!({ "message": "Reservation deleted successfully" })).into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}

pub async fn check_in(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match reservation_service::check_in(state.reservation_repo.as_ref(), &id).await {
        Ok(reservation) => Json(json!({ "reservation": reservation })).into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}

pub async fn check_out(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match reservation_service::check_out(state.reservation_repo.as_ref(), &id).await {
        Ok(reservation) => Json(json!({ "reservation": reservation })).into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}

pub async fn list_payments(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match payment_service::list_payments(
        state.payment_repo.as_ref(),
        state.reservation_repo.as_ref(),
        &id,
    )
    .await
    {
        Ok(summary) => Json(json!(summary)).into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}

pub async fn add_payment(
    _actor: Actor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Response {
    let input = NewPayment {
        reservation_id: id,
        amount: payload.amount,
        payment_date: payload.payment_date,
        payment_method: payload.payment_method,
        notes: payload.notes,
    };

    match payment_service::add_payment(
        state.payment_repo.as_ref(),
        state.reservation_repo.as_ref(),
        input,
    )
    .await
    {
        Ok(payment) => (
            StatusCode::CREATED,
            Json(json!({
                "payment": payment,
                "message": "Payment recorded successfully"
            })),
        )
            .into_response(),
        Err(e) => domain_error(e, "Reservation"),
    }
}
