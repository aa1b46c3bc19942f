use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::Payment;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub reservation_id: String,
    pub amount: f64,
    pub payment_date: String,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reservation::Entity",
        from = "Column::ReservationId",
        to = "super::reservation::Column::Id"
    )]
    Reservation,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Payment {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            reservation_id: model.reservation_id,
            amount: model.amount,
            payment_date: model.payment_date,
            payment_method: model.payment_method,
            notes: model.notes,
            created_at: model.created_at,
        }
    }
}
