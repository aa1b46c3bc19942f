//! Repository implementations using SeaORM

pub mod audit_repository;
pub mod guest_repository;
pub mod payment_repository;
pub mod reservation_repository;
pub mod room_repository;

pub use audit_repository::SeaOrmAuditRepository;
pub use guest_repository::SeaOrmGuestRepository;
pub use payment_repository::SeaOrmPaymentRepository;
pub use reservation_repository::SeaOrmReservationRepository;
pub use room_repository::SeaOrmRoomRepository;
