//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and complex operations.

pub mod availability;
pub mod reservation_service;
pub mod restaurant_service;
pub mod user_service;
