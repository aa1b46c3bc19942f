use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::api::error::{domain_error, error_response};
use crate::domain::Actor;
use crate::services::setup_service;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token for the owner"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> Response {
    match setup_service::login(&db, &payload.email, &payload.password).await {
        Ok(Some(login)) => (
            StatusCode::OK,
            Json(json!({
                "token": login.token,
                "user": login.owner
            })),
        )
            .into_response(),
        Ok(None) => error_response(StatusCode::UNAUTHORIZED, "Invalid credentials", None),
        Err(e) => domain_error(e, "Owner"),
    }
}

pub async fn get_me(actor: Actor) -> impl IntoResponse {
    Json(json!({ "user": actor }))
}
