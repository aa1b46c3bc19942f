//! Services Layer
//!
//! Business rules on top of the repository traits. Handlers call these;
//! nothing here knows about HTTP.

pub mod audit_service;
pub mod guest_service;
pub mod merge_service;
pub mod payment_service;
pub mod reservation_service;
pub mod room_service;
pub mod setup_service;

pub use merge_service::{GuestMerger, MergeConsistency, MergeError, MergeOutcome, MergeRequest};
