//! SeaORM implementation of AuditRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::{AuditEntry, AuditFilter, AuditRepository, DomainError, NewAuditEntry};
use crate::models::audit_log::{self, ActiveModel, Entity as AuditLogEntity};

/// SeaORM-based implementation of AuditRepository
pub struct SeaOrmAuditRepository {
    db: DatabaseConnection,
}

impl SeaOrmAuditRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditRepository for SeaOrmAuditRepository {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, DomainError> {
        let log = ActiveModel {
            action_type: Set(entry.action_type),
            target_table: Set(entry.target_table),
            record_id: Set(entry.record_id),
            change_description: Set(entry.change_description),
            user_id: Set(entry.user_id),
            timestamp: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let result = log.insert(&self.db).await?;
        Ok(AuditEntry::from(result))
    }

    async fn find_all(&self, filter: AuditFilter) -> Result<Vec<AuditEntry>, DomainError> {
        let mut query = AuditLogEntity::find();

        if let Some(record_id) = filter.record_id {
            query = query.filter(audit_log::Column::RecordId.eq(record_id));
        }

        if let Some(action_type) = filter.action_type {
            query = query.filter(audit_log::Column::ActionType.eq(action_type));
        }

        let entries = query
            .order_by_desc(audit_log::Column::Id)
            .all(&self.db)
            .await?;

        Ok(entries.into_iter().map(AuditEntry::from).collect())
    }
}
