use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::AuditEntry;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub action_type: String,
    pub target_table: String,
    pub record_id: Option<String>,
    pub change_description: String,
    pub user_id: Option<String>,
    pub timestamp: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for AuditEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            action_type: model.action_type,
            target_table: model.target_table,
            record_id: model.record_id,
            change_description: model.change_description,
            user_id: model.user_id,
            timestamp: model.timestamp,
        }
    }
}
