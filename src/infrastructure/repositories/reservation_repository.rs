//! SeaORM implementation of ReservationRepository

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};

use crate::domain::{
    DomainError, Guest, Reservation, ReservationInput, ReservationRepository, ReservationStatus,
    ReservationWithDetails, Room,
};
use crate::models::guest::Entity as GuestEntity;
use crate::models::reservation::{self, ActiveModel, Entity as ReservationEntity};
use crate::models::room::{self, Entity as RoomEntity};

/// SeaORM-based implementation of ReservationRepository
pub struct SeaOrmReservationRepository {
    db: DatabaseConnection,
}

impl SeaOrmReservationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Run a reservation query and join guest and room onto each row
    async fn find_with_details(
        &self,
        query: Select<ReservationEntity>,
    ) -> Result<Vec<ReservationWithDetails>, DomainError> {
        let rows = query
            .order_by_asc(reservation::Column::StartDate)
            .find_also_related(GuestEntity)
            .all(&self.db)
            .await?;

        let mut room_ids: Vec<String> = rows.iter().map(|(r, _)| r.room_id.clone()).collect();
        room_ids.sort();
        room_ids.dedup();

        let mut rooms: HashMap<String, Room> = HashMap::new();
        if !room_ids.is_empty() {
            for model in RoomEntity::find()
                .filter(room::Column::Id.is_in(room_ids))
                .all(&self.db)
                .await?
            {
                rooms.insert(model.id.clone(), Room::from(model));
            }
        }

        rows.into_iter()
            .map(|(model, guest)| {
                let room = rooms.get(&model.room_id).cloned();
                Ok(ReservationWithDetails {
                    reservation: Reservation::try_from(model)?,
                    guest: guest.map(Guest::from),
                    room,
                })
            })
            .collect()
    }

    async fn has_active(&self, column: reservation::Column, id: &str) -> Result<bool, DomainError> {
        let terminal: Vec<&str> = ReservationStatus::TERMINAL
            .iter()
            .map(|s| s.as_str())
            .collect();

        let count = ReservationEntity::find()
            .filter(column.eq(id))
            .filter(reservation::Column::Status.is_not_in(terminal))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}

#[async_trait]
impl ReservationRepository for SeaOrmReservationRepository {
    async fn find_all(&self) -> Result<Vec<ReservationWithDetails>, DomainError> {
        self.find_with_details(ReservationEntity::find()).await
    }

    async fn find_in_range(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<ReservationWithDetails>, DomainError> {
        let query = ReservationEntity::find().filter(
            Condition::all()
                .add(reservation::Column::StartDate.gte(from))
                .add(reservation::Column::EndDate.lte(to)),
        );
        self.find_with_details(query).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ReservationWithDetails>, DomainError> {
        let query = ReservationEntity::find().filter(reservation::Column::Id.eq(id));
        Ok(self.find_with_details(query).await?.into_iter().next())
    }

    async fn find_ids_by_guest(&self, guest_id: &str) -> Result<Vec<String>, DomainError> {
        let ids: Vec<String> = ReservationEntity::find()
            .select_only()
            .column(reservation::Column::Id)
            .filter(reservation::Column::GuestId.eq(guest_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids)
    }

    async fn has_active_for_guest(&self, guest_id: &str) -> Result<bool, DomainError> {
        self.has_active(reservation::Column::GuestId, guest_id).await
    }

    async fn has_active_for_room(&self, room_id: &str) -> Result<bool, DomainError> {
        self.has_active(reservation::Column::RoomId, room_id).await
    }

    async fn has_any_for_room(&self, room_id: &str) -> Result<bool, DomainError> {
        let count = ReservationEntity::find()
            .filter(reservation::Column::RoomId.eq(room_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }

    async fn create(&self, input: ReservationInput) -> Result<Reservation, DomainError> {
        let reservation = ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            guest_id: Set(input.guest_id),
            room_id: Set(input.room_id),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            status: Set(input.status.as_str().to_owned()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let result = reservation.insert(&self.db).await?;
        Reservation::try_from(result)
    }

    async fn update(&self, id: &str, input: ReservationInput) -> Result<Reservation, DomainError> {
        let reservation = ReservationEntity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active_model: ActiveModel = reservation.into();
        active_model.guest_id = Set(input.guest_id);
        active_model.room_id = Set(input.room_id);
        active_model.start_date = Set(input.start_date);
        active_model.end_date = Set(input.end_date);
        active_model.status = Set(input.status.as_str().to_owned());

        let model = active_model.update(&self.db).await?;
        Reservation::try_from(model)
    }

    async fn set_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> Result<Reservation, DomainError> {
        let reservation = ReservationEntity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active_model: ActiveModel = reservation.into();
        active_model.status = Set(status.as_str().to_owned());

        let model = active_model.update(&self.db).await?;
        Reservation::try_from(model)
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let result = ReservationEntity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }

    async fn reassign_guest(
        &self,
        from_guest_id: &str,
        to_guest_id: &str,
    ) -> Result<u64, DomainError> {
        let result = ReservationEntity::update_many()
            .col_expr(reservation::Column::GuestId, Expr::value(to_guest_id.to_owned()))
            .filter(reservation::Column::GuestId.eq(from_guest_id))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }

    async fn reassign_reservations(
        &self,
        ids: &[String],
        to_guest_id: &str,
    ) -> Result<u64, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = ReservationEntity::update_many()
            .col_expr(reservation::Column::GuestId, Expr::value(to_guest_id.to_owned()))
            .filter(reservation::Column::Id.is_in(ids.iter().cloned()))
            .exec(&self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
