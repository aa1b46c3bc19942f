//! Room Service - room inventory

use crate::domain::validation;
use crate::domain::{
    DomainError, ReservationRepository, Room, RoomInput, RoomRepository, UpdateRoomInput,
};

const MAX_ROOM_TYPE_LEN: usize = 50;

pub async fn list_rooms(rooms: &dyn RoomRepository, active_only: bool) -> Result<Vec<Room>, DomainError> {
    rooms.find_all(active_only).await
}

pub async fn get_room(rooms: &dyn RoomRepository, id: &str) -> Result<Room, DomainError> {
    rooms.find_by_id(id).await?.ok_or(DomainError::NotFound)
}

pub async fn create_room(rooms: &dyn RoomRepository, input: RoomInput) -> Result<Room, DomainError> {
    let input = RoomInput {
        room_number: validation::room_number(&input.room_number)?,
        room_type: validation::required_text("room_type", &input.room_type, MAX_ROOM_TYPE_LEN)?,
        rate: validation::monetary_amount("rate", input.rate)?,
        is_active: input.is_active,
    };
    ensure_number_free(rooms, &input.room_number, None).await?;

    let room = rooms.create(input).await?;
    tracing::info!("Created room {} ({})", room.room_number, room.id);
    Ok(room)
}

pub async fn update_room(
    rooms: &dyn RoomRepository,
    id: &str,
    input: UpdateRoomInput,
) -> Result<Room, DomainError> {
    get_room(rooms, id).await?;

    let room_number = input
        .room_number
        .as_deref()
        .map(validation::room_number)
        .transpose()?;
    if let Some(number) = &room_number {
        ensure_number_free(rooms, number, Some(id)).await?;
    }

    let input = UpdateRoomInput {
        room_number,
        room_type: input
            .room_type
            .as_deref()
            .map(|t| validation::required_text("room_type", t, MAX_ROOM_TYPE_LEN))
            .transpose()?,
        rate: input
            .rate
            .map(|r| validation::monetary_amount("rate", r))
            .transpose()?,
        is_active: input.is_active,
    };

    rooms.update(id, input).await
}

/// Delete a room that has never been booked. Retire it with `is_active`
/// otherwise.
pub async fn delete_room(
    rooms: &dyn RoomRepository,
    reservations: &dyn ReservationRepository,
    id: &str,
) -> Result<(), DomainError> {
    get_room(rooms, id).await?;

    if reservations.has_active_for_room(id).await? {
        return Err(DomainError::Conflict(
            "Cannot delete room with active reservations".to_string(),
        ));
    }
    if reservations.has_any_for_room(id).await? {
        return Err(DomainError::Conflict(
            "Cannot delete room with reservation history".to_string(),
        ));
    }

    rooms.delete(id).await?;
    tracing::info!("Deleted room {}", id);
    Ok(())
}

async fn ensure_number_free(
    rooms: &dyn RoomRepository,
    room_number: &str,
    except_id: Option<&str>,
) -> Result<(), DomainError> {
    let taken = rooms
        .find_all(false)
        .await?
        .into_iter()
        .any(|room| room.room_number == room_number && Some(room.id.as_str()) != except_id);

    if taken {
        return Err(DomainError::Conflict(format!(
            "Room {} already exists",
            room_number
        )));
    }
    Ok(())
}
