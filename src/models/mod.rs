//! Data models representing database entities and API payloads.

/// Reservations and booking windows
pub mod reservation;
/// Restaurants, tables and opening hours
pub mod restaurant;
/// Owners and customers
pub mod user;
