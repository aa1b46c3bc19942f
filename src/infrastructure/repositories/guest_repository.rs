//! SeaORM implementation of GuestRepository

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::domain::{DomainError, Guest, GuestFields, GuestRepository};
use crate::models::guest::{self, ActiveModel, Entity as GuestEntity};

/// SeaORM-based implementation of GuestRepository
pub struct SeaOrmGuestRepository {
    db: DatabaseConnection,
}

impl SeaOrmGuestRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GuestRepository for SeaOrmGuestRepository {
    async fn find_all(&self) -> Result<Vec<Guest>, DomainError> {
        let guests = GuestEntity::find()
            .order_by_asc(guest::Column::FullName)
            .all(&self.db)
            .await?;

        Ok(guests.into_iter().map(Guest::from).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Guest>, DomainError> {
        let guest = GuestEntity::find_by_id(id.to_owned()).one(&self.db).await?;
        Ok(guest.map(Guest::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Guest>, DomainError> {
        let guest = GuestEntity::find()
            .filter(Expr::expr(Func::lower(Expr::col(guest::Column::Email))).eq(email.to_lowercase()))
            .one(&self.db)
            .await?;
        Ok(guest.map(Guest::from))
    }

    async fn search(&self, term: &str, limit: u64) -> Result<Vec<Guest>, DomainError> {
        // SQLite LIKE is case-insensitive for ASCII
        let guests = GuestEntity::find()
            .filter(
                Condition::any()
                    .add(guest::Column::FullName.contains(term))
                    .add(guest::Column::Email.contains(term)),
            )
            .order_by_asc(guest::Column::FullName)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(guests.into_iter().map(Guest::from).collect())
    }

    async fn create(&self, fields: GuestFields) -> Result<Guest, DomainError> {
        let guest = ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            full_name: Set(fields.full_name),
            email: Set(fields.email),
            phone_number: Set(fields.phone_number),
            address: Set(fields.address),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        let result = guest.insert(&self.db).await?;
        Ok(Guest::from(result))
    }

    async fn update_fields(&self, id: &str, fields: &GuestFields) -> Result<Guest, DomainError> {
        let guest = GuestEntity::find_by_id(id.to_owned())
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active_model: ActiveModel = guest.into();
        active_model.full_name = Set(fields.full_name.clone());
        active_model.email = Set(fields.email.clone());
        active_model.phone_number = Set(fields.phone_number.clone());
        active_model.address = Set(fields.address.clone());

        let model = active_model.update(&self.db).await?;
        Ok(Guest::from(model))
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        let result = GuestEntity::delete_by_id(id.to_owned())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}
