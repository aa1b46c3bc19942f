//! Audit Service - read access to the audit trail

use crate::domain::validation;
use crate::domain::{AuditEntry, AuditFilter, AuditRepository, DomainError};

pub async fn list_entries(
    audit: &dyn AuditRepository,
    filter: AuditFilter,
) -> Result<Vec<AuditEntry>, DomainError> {
    let action_type = validation::normalize_optional(filter.action_type)
        .map(|a| validation::action_type(&a))
        .transpose()?;

    audit
        .find_all(AuditFilter {
            record_id: validation::normalize_optional(filter.record_id),
            action_type,
        })
        .await
}
