//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// Guest data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
}

/// The full set of editable guest fields.
///
/// Used both for creation and for whole-profile overwrites (merge target
/// update). Optional fields are `None` rather than empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestFields {
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl From<&Guest> for GuestFields {
    fn from(guest: &Guest) -> Self {
        Self {
            full_name: guest.full_name.clone(),
            email: guest.email.clone(),
            phone_number: guest.phone_number.clone(),
            address: guest.address.clone(),
        }
    }
}

/// Input for a partial guest update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateGuestInput {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

/// Repository trait for Guest entity
#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Find all guests ordered by name
    async fn find_all(&self) -> Result<Vec<Guest>, DomainError>;

    /// Find a guest by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Guest>, DomainError>;

    /// Find a guest by email, ignoring case
    async fn find_by_email(&self, email: &str) -> Result<Option<Guest>, DomainError>;

    /// Case-insensitive substring search over name and email
    async fn search(&self, term: &str, limit: u64) -> Result<Vec<Guest>, DomainError>;

    /// Create a new guest
    async fn create(&self, fields: GuestFields) -> Result<Guest, DomainError>;

    /// Overwrite every editable field of a guest
    async fn update_fields(&self, id: &str, fields: &GuestFields) -> Result<Guest, DomainError>;

    /// Delete a guest by ID
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}

/// Room data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub room_number: String,
    pub room_type: String,
    pub rate: f64,
    pub is_active: bool,
    pub created_at: String,
}

/// Input for creating a room
#[derive(Debug, Clone, Deserialize)]
pub struct RoomInput {
    pub room_number: String,
    pub room_type: String,
    pub rate: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Input for updating a room
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRoomInput {
    pub room_number: Option<String>,
    pub room_type: Option<String>,
    pub rate: Option<f64>,
    pub is_active: Option<bool>,
}

/// Repository trait for Room entity
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Find rooms ordered by room number
    async fn find_all(&self, active_only: bool) -> Result<Vec<Room>, DomainError>;

    /// Find a room by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Room>, DomainError>;

    /// Create a new room
    async fn create(&self, input: RoomInput) -> Result<Room, DomainError>;

    /// Update a room
    async fn update(&self, id: &str, input: UpdateRoomInput) -> Result<Room, DomainError>;

    /// Delete a room
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
}

/// Lifecycle status of a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::CheckedIn => "checked_in",
            ReservationStatus::CheckedOut => "checked_out",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal reservations no longer block deletion of their guest or room.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReservationStatus::CheckedOut | ReservationStatus::Cancelled
        )
    }

    pub const TERMINAL: [ReservationStatus; 2] =
        [ReservationStatus::CheckedOut, ReservationStatus::Cancelled];
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReservationStatus::Pending),
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "checked_in" => Ok(ReservationStatus::CheckedIn),
            "checked_out" => Ok(ReservationStatus::CheckedOut),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            other => Err(DomainError::Validation(format!(
                "Unknown reservation status '{}'",
                other
            ))),
        }
    }
}

/// Reservation data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub guest_id: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
    pub status: ReservationStatus,
    pub created_at: String,
}

/// Reservation joined with its guest and room
#[derive(Debug, Clone, Serialize)]
pub struct ReservationWithDetails {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub guest: Option<Guest>,
    pub room: Option<Room>,
}

/// Fully resolved reservation fields, used for create and update
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReservationInput {
    pub guest_id: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub status: ReservationStatus,
}

/// Input for a partial reservation update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReservationInput {
    pub guest_id: Option<String>,
    pub room_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<ReservationStatus>,
}

/// Repository trait for Reservation entity
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Find all reservations with guest and room, ordered by start date
    async fn find_all(&self) -> Result<Vec<ReservationWithDetails>, DomainError>;

    /// Reservations with `start_date >= from` and `end_date <= to`
    async fn find_in_range(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<ReservationWithDetails>, DomainError>;

    /// Find a reservation by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<ReservationWithDetails>, DomainError>;

    /// IDs of every reservation held by a guest
    async fn find_ids_by_guest(&self, guest_id: &str) -> Result<Vec<String>, DomainError>;

    /// Whether the guest holds a reservation that is not checked out or cancelled
    async fn has_active_for_guest(&self, guest_id: &str) -> Result<bool, DomainError>;

    /// Whether the room has a reservation that is not checked out or cancelled
    async fn has_active_for_room(&self, room_id: &str) -> Result<bool, DomainError>;

    /// Whether the room has any reservation at all, terminal ones included
    async fn has_any_for_room(&self, room_id: &str) -> Result<bool, DomainError>;

    /// Create a new reservation
    async fn create(&self, input: ReservationInput) -> Result<Reservation, DomainError>;

    /// Replace the fields of a reservation
    async fn update(&self, id: &str, input: ReservationInput) -> Result<Reservation, DomainError>;

    /// Change only the status of a reservation
    async fn set_status(
        &self,
        id: &str,
        status: ReservationStatus,
    ) -> Result<Reservation, DomainError>;

    /// Delete a reservation
    async fn delete(&self, id: &str) -> Result<(), DomainError>;

    /// Point every reservation of `from_guest_id` at `to_guest_id`.
    /// Returns the number of rows changed; zero is not an error.
    async fn reassign_guest(&self, from_guest_id: &str, to_guest_id: &str)
    -> Result<u64, DomainError>;

    /// Point the given reservations at `to_guest_id`
    async fn reassign_reservations(
        &self,
        ids: &[String],
        to_guest_id: &str,
    ) -> Result<u64, DomainError>;
}

/// Payment data for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub reservation_id: String,
    pub amount: f64,
    pub payment_date: String,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
}

/// Input for recording a payment
#[derive(Debug, Clone, Deserialize)]
pub struct NewPayment {
    pub reservation_id: String,
    pub amount: f64,
    pub payment_date: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Repository trait for Payment entity. Payments are append-only.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Payments of a reservation ordered by payment date
    async fn find_by_reservation(&self, reservation_id: &str)
    -> Result<Vec<Payment>, DomainError>;

    /// Record a payment
    async fn create(&self, payment: NewPayment) -> Result<Payment, DomainError>;
}

/// Audit log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i32,
    pub action_type: String,
    pub target_table: String,
    pub record_id: Option<String>,
    pub change_description: String,
    pub user_id: Option<String>,
    pub timestamp: String,
}

/// Input for appending an audit entry
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action_type: String,
    pub target_table: String,
    pub record_id: Option<String>,
    pub change_description: String,
    pub user_id: Option<String>,
}

/// Filter criteria for audit queries
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuditFilter {
    pub record_id: Option<String>,
    pub action_type: Option<String>,
}

/// Repository trait for the audit log. Entries are never updated or deleted.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Append an entry
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, DomainError>;

    /// Entries matching the filter, newest first
    async fn find_all(&self, filter: AuditFilter) -> Result<Vec<AuditEntry>, DomainError>;
}
