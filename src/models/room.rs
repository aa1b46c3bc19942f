use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::Room;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub room_number: String,
    pub room_type: String,
    pub rate: f64,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservation,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Room {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            room_number: model.room_number,
            room_type: model.room_type,
            rate: model.rate,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}
