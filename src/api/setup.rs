use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error::domain_error;
use crate::services::setup_service::{self, SetupInput};

#[derive(Debug, Deserialize)]
pub struct SetupRequest {
    #[serde(default)]
    pub owner_email: String,
    #[serde(default)]
    pub owner_full_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub hotel_name: String,
    #[serde(default)]
    pub timezone: String,
}

pub async fn setup_status(State(db): State<DatabaseConnection>) -> Response {
    match setup_service::setup_status(&db).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => domain_error(e, "Setup"),
    }
}

pub async fn setup(
    State(db): State<DatabaseConnection>,
    Json(req): Json<SetupRequest>,
) -> Response {
    let input = SetupInput {
        owner_email: req.owner_email,
        owner_full_name: req.owner_full_name,
        password: req.password,
        hotel_name: req.hotel_name,
        timezone: req.timezone,
    };

    match setup_service::run_setup(&db, input).await {
        Ok(result) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Setup completed successfully",
                "owner": result.owner,
                "hotel": result.hotel
            })),
        )
            .into_response(),
        Err(e) => domain_error(e, "Setup"),
    }
}
