//! Reservation Service - bookings and their stay lifecycle

use crate::domain::validation;
use crate::domain::{
    DomainError, GuestRepository, PaymentRepository, ReservationInput, ReservationRepository,
    ReservationStatus, ReservationWithDetails, RoomRepository, UpdateReservationInput,
};

/// Repositories a reservation write needs to check its references
pub struct ReservationDeps<'a> {
    pub guests: &'a dyn GuestRepository,
    pub rooms: &'a dyn RoomRepository,
    pub reservations: &'a dyn ReservationRepository,
}

pub async fn list_reservations(
    reservations: &dyn ReservationRepository,
) -> Result<Vec<ReservationWithDetails>, DomainError> {
    reservations.find_all().await
}

/// Reservations fully contained in `[from, to]`
pub async fn list_reservations_in_range(
    reservations: &dyn ReservationRepository,
    from: &str,
    to: &str,
) -> Result<Vec<ReservationWithDetails>, DomainError> {
    let from = validation::date("from", from)?;
    let to = validation::date("to", to)?;
    if to < from {
        return Err(DomainError::Validation(
            "to: must not be before from".to_string(),
        ));
    }

    reservations
        .find_in_range(
            &from.format("%Y-%m-%d").to_string(),
            &to.format("%Y-%m-%d").to_string(),
        )
        .await
}

pub async fn get_reservation(
    reservations: &dyn ReservationRepository,
    id: &str,
) -> Result<ReservationWithDetails, DomainError> {
    reservations
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn create_reservation(
    deps: ReservationDeps<'_>,
    input: ReservationInput,
) -> Result<ReservationWithDetails, DomainError> {
    let input = checked_input(&deps, input).await?;
    let created = deps.reservations.create(input).await?;
    tracing::info!(
        "Created reservation {} for guest {} in room {}",
        created.id,
        created.guest_id,
        created.room_id
    );
    get_reservation(deps.reservations, &created.id).await
}

/// Partial update; the merged result is validated as a whole
pub async fn update_reservation(
    deps: ReservationDeps<'_>,
    id: &str,
    input: UpdateReservationInput,
) -> Result<ReservationWithDetails, DomainError> {
    let current = get_reservation(deps.reservations, id).await?.reservation;

    let merged = ReservationInput {
        guest_id: input.guest_id.unwrap_or(current.guest_id),
        room_id: input.room_id.unwrap_or(current.room_id),
        start_date: input.start_date.unwrap_or(current.start_date),
        end_date: input.end_date.unwrap_or(current.end_date),
        status: input.status.unwrap_or(current.status),
    };
    let merged = checked_input(&deps, merged).await?;

    deps.reservations.update(id, merged).await?;
    get_reservation(deps.reservations, id).await
}

/// Payments are append-only, so a reservation that has any cannot go.
pub async fn delete_reservation(
    reservations: &dyn ReservationRepository,
    payments: &dyn PaymentRepository,
    id: &str,
) -> Result<(), DomainError> {
    get_reservation(reservations, id).await?;

    if !payments.find_by_reservation(id).await?.is_empty() {
        return Err(DomainError::Conflict(
            "Cannot delete reservation with recorded payments".to_string(),
        ));
    }

    reservations.delete(id).await?;
    tracing::info!("Deleted reservation {}", id);
    Ok(())
}

pub async fn check_in(
    reservations: &dyn ReservationRepository,
    id: &str,
) -> Result<ReservationWithDetails, DomainError> {
    transition(
        reservations,
        id,
        &[ReservationStatus::Pending, ReservationStatus::Confirmed],
        ReservationStatus::CheckedIn,
    )
    .await
}

pub async fn check_out(
    reservations: &dyn ReservationRepository,
    id: &str,
) -> Result<ReservationWithDetails, DomainError> {
    transition(
        reservations,
        id,
        &[ReservationStatus::CheckedIn],
        ReservationStatus::CheckedOut,
    )
    .await
}

async fn transition(
    reservations: &dyn ReservationRepository,
    id: &str,
    allowed_from: &[ReservationStatus],
    to: ReservationStatus,
) -> Result<ReservationWithDetails, DomainError> {
    let current = get_reservation(reservations, id).await?.reservation;

    if !allowed_from.contains(&current.status) {
        return Err(DomainError::Conflict(format!(
            "Cannot move reservation from {} to {}",
            current.status, to
        )));
    }

    reservations.set_status(id, to).await?;
    tracing::info!("Reservation {} is now {}", id, to);
    get_reservation(reservations, id).await
}

async fn checked_input(
    deps: &ReservationDeps<'_>,
    input: ReservationInput,
) -> Result<ReservationInput, DomainError> {
    let (start_date, end_date) = validation::stay_dates(&input.start_date, &input.end_date)?;

    if deps.guests.find_by_id(&input.guest_id).await?.is_none() {
        return Err(DomainError::Validation(
            "guest_id: guest does not exist".to_string(),
        ));
    }
    if deps.rooms.find_by_id(&input.room_id).await?.is_none() {
        return Err(DomainError::Validation(
            "room_id: room does not exist".to_string(),
        ));
    }

    Ok(ReservationInput {
        start_date,
        end_date,
        ..input
    })
}
