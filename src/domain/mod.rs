//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum).
//! Only trait definitions, domain types, field rules and error types.

pub mod actor;
pub mod errors;
pub mod repositories;
pub mod validation;

pub use actor::Actor;
pub use errors::DomainError;
pub use repositories::*;
