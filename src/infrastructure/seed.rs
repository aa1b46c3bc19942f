use crate::models::{guest, reservation, room};
use chrono::{Duration, Utc};
use sea_orm::*;

/// Rooms, a few guests (including one likely duplicate pair) and reservations
/// around today. Does nothing when rooms already exist.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if room::Entity::find().count(db).await? > 0 {
        tracing::info!("Rooms already present, skipping demo data");
        return Ok(());
    }

    let now = Utc::now();
    let created_at = now.to_rfc3339();

    // 1. Rooms
    let rooms = [
        ("101", "Single", 89.0),
        ("102", "Double", 129.0),
        ("201", "Suite", 249.0),
    ];
    let mut room_ids = Vec::new();
    for (number, room_type, rate) in rooms {
        let id = uuid::Uuid::new_v4().to_string();
        room::ActiveModel {
            id: Set(id.clone()),
            room_number: Set(number.to_owned()),
            room_type: Set(room_type.to_owned()),
            rate: Set(rate),
            is_active: Set(true),
            created_at: Set(created_at.clone()),
        }
        .insert(db)
        .await?;
        room_ids.push(id);
    }

    // 2. Guests
    let guests = [
        ("Jane Doe", "jane.doe@example.com", Some("+1 555-123-4567")),
        ("J. Doe", "jdoe@example.com", None),
        ("Marco Rossi", "marco.rossi@example.com", Some("+39 06 1234567")),
    ];
    let mut guest_ids = Vec::new();
    for (name, email, phone) in guests {
        let id = uuid::Uuid::new_v4().to_string();
        guest::ActiveModel {
            id: Set(id.clone()),
            full_name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            phone_number: Set(phone.map(str::to_owned)),
            address: Set(None),
            created_at: Set(created_at.clone()),
        }
        .insert(db)
        .await?;
        guest_ids.push(id);
    }

    // 3. Reservations: (guest, room, days from today, nights, status)
    let stays = [
        (0, 0, -3, 2, "checked_out"),
        (0, 1, 1, 3, "confirmed"),
        (1, 2, 0, 2, "checked_in"),
        (2, 0, 7, 4, "pending"),
    ];
    for (guest_idx, room_idx, offset, nights, status) in stays {
        let start = (now + Duration::days(offset)).date_naive();
        let end = start + Duration::days(nights);
        reservation::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            guest_id: Set(guest_ids[guest_idx].clone()),
            room_id: Set(room_ids[room_idx].clone()),
            start_date: Set(start.format("%Y-%m-%d").to_string()),
            end_date: Set(end.format("%Y-%m-%d").to_string()),
            status: Set(status.to_owned()),
            created_at: Set(created_at.clone()),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
