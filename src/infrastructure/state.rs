//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{
    AuditRepository, GuestRepository, PaymentRepository, ReservationRepository, RoomRepository,
};
use crate::infrastructure::{
    SeaOrmAuditRepository, SeaOrmGuestRepository, SeaOrmPaymentRepository,
    SeaOrmReservationRepository, SeaOrmRoomRepository,
};
use crate::services::{GuestMerger, MergeConsistency};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection, for the services that work on entities directly
    db: DatabaseConnection,
    pub guest_repo: Arc<dyn GuestRepository>,
    pub room_repo: Arc<dyn RoomRepository>,
    pub reservation_repo: Arc<dyn ReservationRepository>,
    pub payment_repo: Arc<dyn PaymentRepository>,
    pub audit_repo: Arc<dyn AuditRepository>,
    /// How a failed merge treats its already applied steps
    pub merge_consistency: MergeConsistency,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            guest_repo: Arc::new(SeaOrmGuestRepository::new(db.clone())),
            room_repo: Arc::new(SeaOrmRoomRepository::new(db.clone())),
            reservation_repo: Arc::new(SeaOrmReservationRepository::new(db.clone())),
            payment_repo: Arc::new(SeaOrmPaymentRepository::new(db.clone())),
            audit_repo: Arc::new(SeaOrmAuditRepository::new(db.clone())),
            merge_consistency: MergeConsistency::default(),
            db,
        }
    }

    pub fn with_merge_consistency(mut self, consistency: MergeConsistency) -> Self {
        self.merge_consistency = consistency;
        self
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// A merge orchestrator over this state's repositories
    pub fn guest_merger(&self) -> GuestMerger {
        GuestMerger::new(
            self.guest_repo.clone(),
            self.reservation_repo.clone(),
            self.audit_repo.clone(),
        )
        .with_consistency(self.merge_consistency)
    }
}

impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
