//! SeaORM implementation of RoomRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::domain::{DomainError, Room, RoomInput, RoomRepository, UpdateRoomInput};
use crate::models::room::{self, ActiveModel, Entity as RoomEntity};

/// SeaORM-based implementation of RoomRepository
pub struct SeaOrmRoomRepository {
    db: DatabaseConnection,
}

impl SeaOrmRoomRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoomRepository for SeaOrmRoomRepository {
    async fn find_all(&self, active_only: bool) -> Result<Vec<Room>, DomainError> {
        let mut query = RoomEntity::find();
        if active_only {
            query = query.filter(room::Column::IsActive.eq(true));
        }

        let rooms = query
            .order_by_asc(room::Column::RoomNumber)
            .all(&self.db)
            .await?;

        Ok(rooms.into_iter().map(Room::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, DomainError> {
        let room = RoomEntity::find_by_id(id.to_owned()).one(&self.db).await?;
        Ok(room.map(Room::from))
    }

    async fn create(&self, input: RoomInput) -> Result<Room, DomainError> {
        let room = ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            room_number: Set(input.room_number),
            room_type: Set(input.room_type),
            rate: Set(input.rate),
            is_active: Set(input.is_active),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let result = room.insert(&self.db).await?;
        Ok(Room::from(result))
    }

    async fn update(&self, id: &str, input: UpdateRoomInput) -> Result<Room, DomainError> {
        let room = RoomEntity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active_model: ActiveModel = room.into();

        if let Some(room_number) = input.room_number {
            active_model.room_number = Set(room_number);
        }
        if let Some(room_type) = input.room_type {
            active_model.room_type = Set(room_type);
        }
        if let Some(rate) = input.rate {
            active_model.rate = Set(rate);
        }
        if let Some(is_active) = input.is_active {
            active_model.is_active = Set(is_active);
        }

        let model = active_model.update(&self.db).await?;
        Ok(Room::from(model))
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let result = RoomEntity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}
