//! Merge Service - folds a duplicate guest record into the one that survives.
//!
//! A merge is a linear pipeline with no persisted intermediate state:
//!
//! `Validate -> Reassign -> UpdateTarget -> Audit (best effort) -> DeleteSource`
//!
//! Every precondition is checked before the first write. Each mutating step is
//! a single repository statement; there is no surrounding database
//! transaction. In [`MergeConsistency::Compensating`] mode the inverse of each
//! step is recorded before it runs and replayed in reverse order if a later
//! step fails. In [`MergeConsistency::Lenient`] mode a failure leaves the
//! already applied steps in place.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::validation;
use crate::domain::{
    Actor, AuditRepository, DomainError, Guest, GuestFields, GuestRepository, NewAuditEntry,
    ReservationRepository,
};

pub const MERGE_ACTION: &str = "GUEST_MERGE";
pub const MERGE_REVERTED_ACTION: &str = "GUEST_MERGE_REVERTED";
const GUESTS_TABLE: &str = "guests";
const MAX_DESCRIPTION_LEN: usize = 1000;

/// What happens to already applied steps when a later step fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeConsistency {
    /// Undo applied steps using the recorded inverses
    #[default]
    Compensating,
    /// Leave applied steps in place
    Lenient,
}

impl FromStr for MergeConsistency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compensating" => Ok(MergeConsistency::Compensating),
            "lenient" => Ok(MergeConsistency::Lenient),
            other => Err(format!("Unknown merge consistency mode '{}'", other)),
        }
    }
}

/// Field values chosen by the user for the surviving guest, as submitted
#[derive(Debug, Clone, Default)]
pub struct MergedFieldsInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MergeRequest {
    pub target_guest_id: String,
    pub source_guest_id: String,
    pub merged_fields: Option<MergedFieldsInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub target_guest_id: String,
    pub merged_fields: GuestFields,
    pub reassigned_reservations: u64,
}

/// The mutating steps of a merge, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStep {
    ReassignReservations,
    UpdateTarget,
    DeleteSource,
}

impl MergeStep {
    fn failure_message(&self) -> &'static str {
        match self {
            MergeStep::ReassignReservations => "Failed to reassign reservations",
            MergeStep::UpdateTarget => "Failed to update target guest",
            MergeStep::DeleteSource => "Failed to delete source guest",
        }
    }
}

impl fmt::Display for MergeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeStep::ReassignReservations => "reassign_reservations",
            MergeStep::UpdateTarget => "update_target",
            MergeStep::DeleteSource => "delete_source",
        };
        f.write_str(name)
    }
}

/// State of the data after a failed mutation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureState {
    /// The failing step was the first write
    NothingApplied,
    /// Earlier steps were applied and then undone
    Reverted,
    /// Earlier steps remain applied
    PartiallyApplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuestRole {
    Source,
    Target,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeError {
    /// No resolved actor
    Unauthorized,
    /// Malformed request; nothing was attempted
    InvalidRequest(String),
    /// One of the two guests does not exist; nothing was attempted
    NotFound(GuestRole),
    /// A repository write failed part way through the pipeline
    MutationFailure {
        step: MergeStep,
        message: String,
        state: FailureState,
    },
    /// A read failed while checking preconditions
    Internal(String),
}

impl MergeError {
    /// Secondary information for the caller, if any
    pub fn details(&self) -> Option<String> {
        match self {
            MergeError::MutationFailure { message, state, .. } => Some(match state {
                FailureState::NothingApplied => message.clone(),
                FailureState::Reverted => format!("{} (earlier changes were reverted)", message),
                FailureState::PartiallyApplied => {
                    format!("{} (earlier changes remain applied)", message)
                }
            }),
            MergeError::Internal(message) => Some(message.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::Unauthorized => write!(f, "Invalid authorization token"),
            MergeError::InvalidRequest(msg) => write!(f, "{}", msg),
            MergeError::NotFound(GuestRole::Source) => write!(f, "Source guest not found"),
            MergeError::NotFound(GuestRole::Target) => write!(f, "Target guest not found"),
            MergeError::MutationFailure { step, .. } => write!(f, "{}", step.failure_message()),
            MergeError::Internal(_) => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for MergeError {}

/// Inverse of an applied step
enum Compensation {
    MoveReservationsBack { ids: Vec<String>, to: String },
    RestoreTarget { id: String, fields: GuestFields },
}

pub struct GuestMerger {
    guests: Arc<dyn GuestRepository>,
    reservations: Arc<dyn ReservationRepository>,
    audit: Arc<dyn AuditRepository>,
    consistency: MergeConsistency,
}

impl GuestMerger {
    pub fn new(
        guests: Arc<dyn GuestRepository>,
        reservations: Arc<dyn ReservationRepository>,
        audit: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            guests,
            reservations,
            audit,
            consistency: MergeConsistency::default(),
        }
    }

    pub fn with_consistency(mut self, consistency: MergeConsistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// Merge `source_guest_id` into `target_guest_id` on behalf of `actor`.
    pub async fn merge(
        &self,
        actor: &Actor,
        request: MergeRequest,
    ) -> Result<MergeOutcome, MergeError> {
        if actor.is_anonymous() {
            return Err(MergeError::Unauthorized);
        }

        let ValidatedMerge {
            target_id,
            source_id,
            merged_fields,
        } = validate_request(&request)?;
        let source = self.load_guest(&source_id, GuestRole::Source).await?;
        let target = self.load_guest(&target_id, GuestRole::Target).await?;

        tracing::info!(
            actor = %actor.id,
            source = %source.id,
            target = %target.id,
            consistency = ?self.consistency,
            "Merging guests"
        );

        let compensating = self.consistency == MergeConsistency::Compensating;
        let mut undo: Vec<Compensation> = Vec::new();
        let mut applied = false;

        // 1. Reassign reservations. When compensating, exactly the recorded
        // ids move, so the inverse moves back the same set.
        let moved = if compensating {
            let ids = self
                .reservations
                .find_ids_by_guest(&source.id)
                .await
                .map_err(|e| MergeError::Internal(e.to_string()))?;
            let moved = self
                .reservations
                .reassign_reservations(&ids, &target.id)
                .await;
            undo.push(Compensation::MoveReservationsBack {
                ids,
                to: source.id.clone(),
            });
            moved
        } else {
            self.reservations
                .reassign_guest(&source.id, &target.id)
                .await
        };
        let reassigned = match moved {
            Ok(count) => count,
            Err(e) => {
                undo.clear();
                return Err(self
                    .fail(MergeStep::ReassignReservations, e, applied, undo, None)
                    .await);
            }
        };
        applied = true;
        tracing::debug!(count = reassigned, "Reservations reassigned");

        // 2. Overwrite the target profile
        if compensating {
            undo.push(Compensation::RestoreTarget {
                id: target.id.clone(),
                fields: GuestFields::from(&target),
            });
        }
        if let Err(e) = self.guests.update_fields(&target.id, &merged_fields).await {
            undo.pop();
            return Err(self
                .fail(MergeStep::UpdateTarget, e, applied, undo, None)
                .await);
        }

        // 3. Audit, best effort
        let description = describe_merge(&source, &target, &merged_fields, reassigned);
        let audited = self
            .record_audit(MERGE_ACTION, &target.id, description, actor)
            .await;

        // 4. Delete the source
        if let Err(e) = self.guests.delete(&source.id).await {
            let audit_context = audited.then_some((&target.id, actor));
            return Err(self
                .fail(MergeStep::DeleteSource, e, applied, undo, audit_context)
                .await);
        }

        tracing::info!(
            source = %source.id,
            target = %target.id,
            reassigned,
            "Guests merged successfully"
        );

        Ok(MergeOutcome {
            target_guest_id: target.id,
            merged_fields,
            reassigned_reservations: reassigned,
        })
    }

    async fn load_guest(&self, id: &str, role: GuestRole) -> Result<Guest, MergeError> {
        match self.guests.find_by_id(id).await {
            Ok(Some(guest)) => Ok(guest),
            Ok(None) => Err(MergeError::NotFound(role)),
            Err(e) => {
                tracing::error!("Failed to load {:?} guest {}: {}", role, id, e);
                Err(MergeError::Internal(e.to_string()))
            }
        }
    }

    /// Append an audit entry. Failures are logged and reported as `false`.
    async fn record_audit(
        &self,
        action_type: &str,
        record_id: &str,
        change_description: String,
        actor: &Actor,
    ) -> bool {
        let entry = NewAuditEntry {
            action_type: action_type.to_string(),
            target_table: GUESTS_TABLE.to_string(),
            record_id: Some(record_id.to_string()),
            change_description,
            user_id: Some(actor.id.clone()),
        };

        match self.audit.append(entry).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Failed to create audit log entry {}: {}", action_type, e);
                false
            }
        }
    }

    /// Turn a failed step into a `MutationFailure`, compensating first when
    /// inverses were recorded.
    async fn fail(
        &self,
        step: MergeStep,
        error: DomainError,
        applied: bool,
        undo: Vec<Compensation>,
        audit_context: Option<(&String, &Actor)>,
    ) -> MergeError {
        tracing::error!(step = %step, "{}: {}", step.failure_message(), error);

        let state = if !applied {
            FailureState::NothingApplied
        } else if undo.is_empty() {
            FailureState::PartiallyApplied
        } else if self.compensate(undo).await {
            if let Some((target_id, actor)) = audit_context {
                let description = format!(
                    "Reverted merge into guest {} after step {} failed: {}",
                    target_id, step, error
                );
                self.record_audit(MERGE_REVERTED_ACTION, target_id, description, actor)
                    .await;
            }
            FailureState::Reverted
        } else {
            FailureState::PartiallyApplied
        };

        MergeError::MutationFailure {
            step,
            message: error.to_string(),
            state,
        }
    }

    /// Replay inverses newest first. Returns whether every inverse succeeded.
    async fn compensate(&self, undo: Vec<Compensation>) -> bool {
        let mut clean = true;

        for compensation in undo.into_iter().rev() {
            let result = match &compensation {
                Compensation::RestoreTarget { id, fields } => {
                    self.guests.update_fields(id, fields).await.map(|_| ())
                }
                Compensation::MoveReservationsBack { ids, to } => self
                    .reservations
                    .reassign_reservations(ids, to)
                    .await
                    .map(|_| ()),
            };

            if let Err(e) = result {
                tracing::error!("Merge compensation failed: {}", e);
                clean = false;
            }
        }

        if clean {
            tracing::warn!("Merge reverted after a failed step");
        }
        clean
    }
}

/// A request that passed preconditions 2 and 3, ids trimmed
struct ValidatedMerge {
    target_id: String,
    source_id: String,
    merged_fields: GuestFields,
}

/// Preconditions 2 and 3: distinct ids and a usable field set.
fn validate_request(request: &MergeRequest) -> Result<ValidatedMerge, MergeError> {
    let target = request.target_guest_id.trim();
    let source = request.source_guest_id.trim();

    if target.is_empty() || source.is_empty() {
        return Err(MergeError::InvalidRequest(
            "Missing required fields".to_string(),
        ));
    }
    if target == source {
        return Err(MergeError::InvalidRequest(
            "Cannot merge guest with itself".to_string(),
        ));
    }

    let fields = request
        .merged_fields
        .as_ref()
        .ok_or_else(|| MergeError::InvalidRequest("Missing required fields".to_string()))?;

    let to_invalid = |e: DomainError| match e {
        DomainError::Validation(msg) => MergeError::InvalidRequest(msg),
        other => MergeError::InvalidRequest(other.to_string()),
    };

    let full_name = validation::required_text(
        "full_name",
        fields.full_name.as_deref().unwrap_or_default(),
        validation::MAX_NAME_LEN,
    )
    .map_err(to_invalid)?;
    let email = validation::email(fields.email.as_deref().unwrap_or_default()).map_err(to_invalid)?;

    Ok(ValidatedMerge {
        target_id: target.to_string(),
        source_id: source.to_string(),
        merged_fields: GuestFields {
            full_name,
            email,
            phone_number: validation::normalize_optional(fields.phone_number.clone()),
            address: validation::normalize_optional(fields.address.clone()),
        },
    })
}

fn describe_merge(source: &Guest, target: &Guest, merged: &GuestFields, reassigned: u64) -> String {
    let description = format!(
        "Merged guest \"{}\" ({}) into \"{}\" ({}), previously \"{}\" ({}). {} reservation(s) reassigned.",
        source.full_name,
        source.email,
        merged.full_name,
        merged.email,
        target.full_name,
        target.email,
        reassigned
    );
    description.chars().take(MAX_DESCRIPTION_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AuditEntry, AuditFilter, Reservation, ReservationInput, ReservationStatus,
        ReservationWithDetails,
    };
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Guests, reservations and audit rows in memory, with switchable faults.
    #[derive(Default)]
    struct Store {
        guests: Mutex<BTreeMap<String, Guest>>,
        reservations: Mutex<BTreeMap<String, Reservation>>,
        audit: Mutex<Vec<AuditEntry>>,
        fail_update: Mutex<bool>,
        fail_delete: Mutex<bool>,
        fail_audit: bool,
        fail_restore: bool,
    }

    impl Store {
        fn add_guest(&self, id: &str, name: &str, email: &str) {
            self.guests.lock().unwrap().insert(
                id.to_string(),
                Guest {
                    id: id.to_string(),
                    full_name: name.to_string(),
                    email: email.to_string(),
                    phone_number: None,
                    address: None,
                    created_at: "2024-01-01T00:00:00+00:00".to_string(),
                },
            );
        }

        fn add_reservation(&self, id: &str, guest_id: &str) {
            self.reservations.lock().unwrap().insert(
                id.to_string(),
                Reservation {
                    id: id.to_string(),
                    guest_id: guest_id.to_string(),
                    room_id: "room-1".to_string(),
                    start_date: "2024-06-01".to_string(),
                    end_date: "2024-06-03".to_string(),
                    status: ReservationStatus::Confirmed,
                    created_at: "2024-01-01T00:00:00+00:00".to_string(),
                },
            );
        }

        fn guest(&self, id: &str) -> Option<Guest> {
            self.guests.lock().unwrap().get(id).cloned()
        }

        fn owners(&self) -> Vec<String> {
            self.reservations
                .lock()
                .unwrap()
                .values()
                .map(|r| r.guest_id.clone())
                .collect()
        }

        fn audit_actions(&self) -> Vec<String> {
            self.audit
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.action_type.clone())
                .collect()
        }
    }

    #[async_trait]
    impl GuestRepository for Store {
        async fn find_all(&self) -> Result<Vec<Guest>, DomainError> {
            Ok(self.guests.lock().unwrap().values().cloned().collect())
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Guest>, DomainError> {
            Ok(self.guest(id))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Guest>, DomainError> {
            Ok(self
                .guests
                .lock()
                .unwrap()
                .values()
                .find(|g| g.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn search(&self, _term: &str, _limit: u64) -> Result<Vec<Guest>, DomainError> {
            Ok(Vec::new())
        }

        async fn create(&self, _fields: GuestFields) -> Result<Guest, DomainError> {
            Err(DomainError::Internal("not used".into()))
        }

        async fn update_fields(&self, id: &str, fields: &GuestFields) -> Result<Guest, DomainError> {
            let mut fail = self.fail_update.lock().unwrap();
            if *fail {
                // Only the forward update fails; a restore may still be attempted.
                *fail = self.fail_restore;
                return Err(DomainError::Database("update rejected".into()));
            }
            let mut guests = self.guests.lock().unwrap();
            let guest = guests.get_mut(id).ok_or(DomainError::NotFound)?;
            guest.full_name = fields.full_name.clone();
            guest.email = fields.email.clone();
            guest.phone_number = fields.phone_number.clone();
            guest.address = fields.address.clone();
            Ok(guest.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), DomainError> {
            if *self.fail_delete.lock().unwrap() {
                return Err(DomainError::Database("delete rejected".into()));
            }
            self.guests
                .lock()
                .unwrap()
                .remove(id)
                .map(|_| ())
                .ok_or(DomainError::NotFound)
        }
    }

    #[async_trait]
    impl ReservationRepository for Store {
        async fn find_all(&self) -> Result<Vec<ReservationWithDetails>, DomainError> {
            Ok(Vec::new())
        }

        async fn find_in_range(
            &self,
            _from: &str,
            _to: &str,
        ) -> Result<Vec<ReservationWithDetails>, DomainError> {
            Ok(Vec::new())
        }

        async fn find_by_id(
            &self,
            _id: &str,
        ) -> Result<Option<ReservationWithDetails>, DomainError> {
            Ok(None)
        }

        async fn find_ids_by_guest(&self, guest_id: &str) -> Result<Vec<String>, DomainError> {
            Ok(self
                .reservations
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.guest_id == guest_id)
                .map(|r| r.id.clone())
                .collect())
        }

        async fn has_active_for_guest(&self, _guest_id: &str) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn has_active_for_room(&self, _room_id: &str) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn has_any_for_room(&self, _room_id: &str) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn create(&self, _input: ReservationInput) -> Result<Reservation, DomainError> {
            Err(DomainError::Internal("not used".into()))
        }

        async fn update(
            &self,
            _id: &str,
            _input: ReservationInput,
        ) -> Result<Reservation, DomainError> {
            Err(DomainError::Internal("not used".into()))
        }

        async fn set_status(
            &self,
            _id: &str,
            _status: ReservationStatus,
        ) -> Result<Reservation, DomainError> {
            Err(DomainError::Internal("not used".into()))
        }

        async fn delete(&self, _id: &str) -> Result<(), DomainError> {
            Err(DomainError::Internal("not used".into()))
        }

        async fn reassign_guest(&self, from: &str, to: &str) -> Result<u64, DomainError> {
            let mut count = 0;
            for reservation in self.reservations.lock().unwrap().values_mut() {
                if reservation.guest_id == from {
                    reservation.guest_id = to.to_string();
                    count += 1;
                }
            }
            Ok(count)
        }

        async fn reassign_reservations(&self, ids: &[String], to: &str) -> Result<u64, DomainError> {
            let mut count = 0;
            for reservation in self.reservations.lock().unwrap().values_mut() {
                if ids.contains(&reservation.id) {
                    reservation.guest_id = to.to_string();
                    count += 1;
                }
            }
            Ok(count)
        }
    }

    #[async_trait]
    impl AuditRepository for Store {
        async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, DomainError> {
            if self.fail_audit {
                return Err(DomainError::Database("audit_log is read-only".into()));
            }
            let mut audit = self.audit.lock().unwrap();
            let row = AuditEntry {
                id: audit.len() as i32 + 1,
                action_type: entry.action_type,
                target_table: entry.target_table,
                record_id: entry.record_id,
                change_description: entry.change_description,
                user_id: entry.user_id,
                timestamp: "2024-01-01T00:00:00+00:00".to_string(),
            };
            audit.push(row.clone());
            Ok(row)
        }

        async fn find_all(&self, _filter: AuditFilter) -> Result<Vec<AuditEntry>, DomainError> {
            Ok(self.audit.lock().unwrap().clone())
        }
    }

    fn seeded(store: Store) -> Arc<Store> {
        store.add_guest("a", "Jane Doe", "jane@x.com");
        store.add_guest("b", "J. Doe", "jdoe@x.com");
        store.add_reservation("r1", "b");
        store.add_reservation("r2", "b");
        Arc::new(store)
    }

    fn merger(store: &Arc<Store>, consistency: MergeConsistency) -> GuestMerger {
        GuestMerger::new(store.clone(), store.clone(), store.clone()).with_consistency(consistency)
    }

    fn request(target: &str, source: &str) -> MergeRequest {
        MergeRequest {
            target_guest_id: target.to_string(),
            source_guest_id: source.to_string(),
            merged_fields: Some(MergedFieldsInput {
                full_name: Some("Jane Doe".to_string()),
                email: Some("jane@x.com".to_string()),
                phone_number: Some("".to_string()),
                address: None,
            }),
        }
    }

    fn actor() -> Actor {
        Actor::new("owner-1", "owner@hotel.test")
    }

    #[tokio::test]
    async fn merge_moves_reservations_updates_target_and_deletes_source() {
        let store = seeded(Store::default());

        let outcome = merger(&store, MergeConsistency::Compensating)
            .merge(&actor(), request("a", "b"))
            .await
            .expect("merge succeeds");

        assert_eq!(outcome.target_guest_id, "a");
        assert_eq!(outcome.reassigned_reservations, 2);
        assert_eq!(outcome.merged_fields.phone_number, None);
        assert!(store.guest("b").is_none());
        assert!(store.owners().iter().all(|g| g == "a"));

        let audit = store.audit.lock().unwrap().clone();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action_type, MERGE_ACTION);
        assert_eq!(audit[0].target_table, "guests");
        assert_eq!(audit[0].record_id.as_deref(), Some("a"));
        assert_eq!(audit[0].user_id.as_deref(), Some("owner-1"));
        assert!(audit[0].change_description.contains("J. Doe"));
        assert!(audit[0].change_description.contains("jdoe@x.com"));
        assert!(audit[0].change_description.contains("jane@x.com"));
    }

    #[tokio::test]
    async fn anonymous_actor_is_unauthorized() {
        let store = seeded(Store::default());

        let err = merger(&store, MergeConsistency::Compensating)
            .merge(&Actor::new("", ""), request("a", "b"))
            .await
            .unwrap_err();

        assert_eq!(err, MergeError::Unauthorized);
        assert!(store.guest("b").is_some());
    }

    #[tokio::test]
    async fn self_merge_is_rejected_before_any_write() {
        let store = seeded(Store::default());

        let err = merger(&store, MergeConsistency::Compensating)
            .merge(&actor(), request("a", "a"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            MergeError::InvalidRequest("Cannot merge guest with itself".into())
        );
        assert!(store.owners().iter().all(|g| g == "b"));
        assert!(store.audit_actions().is_empty());
    }

    #[tokio::test]
    async fn missing_or_malformed_fields_are_invalid() {
        let store = seeded(Store::default());
        let merger = merger(&store, MergeConsistency::Compensating);

        let mut no_fields = request("a", "b");
        no_fields.merged_fields = None;
        assert!(matches!(
            merger.merge(&actor(), no_fields).await,
            Err(MergeError::InvalidRequest(_))
        ));

        let mut bad_email = request("a", "b");
        bad_email.merged_fields.as_mut().unwrap().email = Some("not-an-email".into());
        assert!(matches!(
            merger.merge(&actor(), bad_email).await,
            Err(MergeError::InvalidRequest(_))
        ));

        let mut blank_name = request("a", "b");
        blank_name.merged_fields.as_mut().unwrap().full_name = Some("  ".into());
        assert!(matches!(
            merger.merge(&actor(), blank_name).await,
            Err(MergeError::InvalidRequest(_))
        ));

        assert!(store.guest("b").is_some());
    }

    #[tokio::test]
    async fn unknown_guests_are_reported_by_role() {
        let store = seeded(Store::default());
        let merger = merger(&store, MergeConsistency::Compensating);

        assert_eq!(
            merger.merge(&actor(), request("a", "ghost")).await,
            Err(MergeError::NotFound(GuestRole::Source))
        );
        assert_eq!(
            merger.merge(&actor(), request("ghost", "b")).await,
            Err(MergeError::NotFound(GuestRole::Target))
        );
        assert!(store.guest("b").is_some());
        assert!(store.owners().iter().all(|g| g == "b"));
    }

    #[tokio::test]
    async fn padded_ids_are_trimmed_for_every_step() {
        let store = seeded(Store::default());

        let outcome = merger(&store, MergeConsistency::Compensating)
            .merge(&actor(), request(" a ", "b\t"))
            .await
            .expect("merge succeeds");

        assert_eq!(outcome.target_guest_id, "a");
        assert_eq!(outcome.reassigned_reservations, 2);
        assert!(store.guest("b").is_none());
        assert!(store.owners().iter().all(|g| g == "a"));
        assert_eq!(store.audit.lock().unwrap()[0].record_id.as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn source_without_reservations_merges_with_zero_rows() {
        let store = Arc::new(Store::default());
        store.add_guest("a", "Jane Doe", "jane@x.com");
        store.add_guest("b", "J. Doe", "jdoe@x.com");

        let outcome = merger(&store, MergeConsistency::Lenient)
            .merge(&actor(), request("a", "b"))
            .await
            .expect("merge succeeds");

        assert_eq!(outcome.reassigned_reservations, 0);
        assert!(store.guest("b").is_none());
    }

    #[tokio::test]
    async fn lenient_update_failure_leaves_reservations_reassigned() {
        let store = seeded(Store::default());
        *store.fail_update.lock().unwrap() = true;

        let err = merger(&store, MergeConsistency::Lenient)
            .merge(&actor(), request("a", "b"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MergeError::MutationFailure {
                step: MergeStep::UpdateTarget,
                state: FailureState::PartiallyApplied,
                ..
            }
        ));
        assert!(store.owners().iter().all(|g| g == "a"));
        assert!(store.guest("b").is_some());
        assert_eq!(store.guest("a").unwrap().full_name, "Jane Doe");
    }

    #[tokio::test]
    async fn compensating_update_failure_moves_reservations_back() {
        let store = seeded(Store::default());
        *store.fail_update.lock().unwrap() = true;

        let err = merger(&store, MergeConsistency::Compensating)
            .merge(&actor(), request("a", "b"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MergeError::MutationFailure {
                step: MergeStep::UpdateTarget,
                state: FailureState::Reverted,
                ..
            }
        ));
        assert!(store.owners().iter().all(|g| g == "b"));
        assert!(store.guest("b").is_some());
        assert!(store.audit_actions().is_empty());
    }

    #[tokio::test]
    async fn compensating_delete_failure_restores_target_and_reservations() {
        let store = Arc::new(Store::default());
        store.add_guest("a", "Jane Roe", "jane.roe@x.com");
        store.add_guest("b", "J. Doe", "jdoe@x.com");
        store.add_reservation("r1", "b");
        *store.fail_delete.lock().unwrap() = true;

        let err = merger(&store, MergeConsistency::Compensating)
            .merge(&actor(), request("a", "b"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MergeError::MutationFailure {
                step: MergeStep::DeleteSource,
                state: FailureState::Reverted,
                ..
            }
        ));
        let target = store.guest("a").unwrap();
        assert_eq!(target.full_name, "Jane Roe");
        assert_eq!(target.email, "jane.roe@x.com");
        assert!(store.owners().iter().all(|g| g == "b"));
        assert_eq!(
            store.audit_actions(),
            vec![MERGE_ACTION.to_string(), MERGE_REVERTED_ACTION.to_string()]
        );
    }

    #[tokio::test]
    async fn audit_failure_does_not_abort_the_merge() {
        let store = seeded(Store {
            fail_audit: true,
            ..Default::default()
        });

        let outcome = merger(&store, MergeConsistency::Compensating)
            .merge(&actor(), request("a", "b"))
            .await;

        assert!(outcome.is_ok());
        assert!(store.guest("b").is_none());
        assert!(store.audit_actions().is_empty());
    }

    #[test]
    fn failure_details_describe_what_remains() {
        let err = MergeError::MutationFailure {
            step: MergeStep::UpdateTarget,
            message: "Database error: locked".into(),
            state: FailureState::PartiallyApplied,
        };
        assert_eq!(err.to_string(), "Failed to update target guest");
        assert_eq!(
            err.details().as_deref(),
            Some("Database error: locked (earlier changes remain applied)")
        );
        assert_eq!(MergeError::NotFound(GuestRole::Source).details(), None);
    }

    #[test]
    fn consistency_mode_parses_case_insensitively() {
        assert_eq!(
            "Lenient".parse::<MergeConsistency>(),
            Ok(MergeConsistency::Lenient)
        );
        assert_eq!(
            "compensating".parse::<MergeConsistency>(),
            Ok(MergeConsistency::Compensating)
        );
        assert!("strict".parse::<MergeConsistency>().is_err());
    }
}
