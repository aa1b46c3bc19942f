use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Reservation};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reservations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub guest_id: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
    #[sea_orm(default_value = "pending")]
    pub status: String, // pending, confirmed, checked_in, checked_out, cancelled
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::guest::Entity",
        from = "Column::GuestId",
        to = "super::guest::Column::Id"
    )]
    Guest,
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::guest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Guest.def()
    }
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Reservation {
    type Error = DomainError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: model.status.parse()?,
            id: model.id,
            guest_id: model.guest_id,
            room_id: model.room_id,
            start_date: model.start_date,
            end_date: model.end_date,
            created_at: model.created_at,
        })
    }
}
