pub mod audit_log;
pub mod guest;
pub mod hotel_settings;
pub mod payment;
pub mod reservation;
pub mod room;
pub mod user;
