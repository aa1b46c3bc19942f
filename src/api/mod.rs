pub mod audit;
pub mod auth;
pub mod error;
pub mod guests;
pub mod health;
pub mod reservations;
pub mod rooms;
pub mod setup;

use axum::{
    Router,
    routing::{get, post},
};

use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth & first-run setup
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::get_me))
        .route("/setup", post(setup::setup))
        .route("/setup/status", get(setup::setup_status))
        // Guests
        .route("/guests", get(guests::list_guests).post(guests::create_guest))
        .route("/guests/search", get(guests::search_guests))
        .route("/guests/duplicates", get(guests::find_duplicates))
        .route("/guests/merge", post(guests::merge_guests))
        .route(
            "/guests/:id",
            get(guests::get_guest)
                .put(guests::update_guest)
                .delete(guests::delete_guest),
        )
        // Rooms
        .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
        .route(
            "/rooms/:id",
            get(rooms::get_room)
                .put(rooms::update_room)
                .delete(rooms::delete_room),
        )
        // Reservations
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/reservations/range",
            get(reservations::list_reservations_in_range),
        )
        .route(
            "/reservations/:id",
            get(reservations::get_reservation)
                .put(reservations::update_reservation)
                .delete(reservations::delete_reservation),
        )
        .route("/reservations/:id/check-in", post(reservations::check_in))
        .route("/reservations/:id/check-out", post(reservations::check_out))
        .route(
            "/reservations/:id/payments",
            get(reservations::list_payments).post(reservations::add_payment),
        )
        // Audit
        .route("/audit-log", get(audit::list_audit_log))
        .with_state(state)
}
