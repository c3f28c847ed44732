//! Transactional storage seam for the booking core.
//!
//! The reservation service never touches SQL directly. It opens a
//! [`UnitOfWork`] from a [`ReservationStore`], runs the availability scan
//! and the resulting write through it, and commits. Dropping a unit of
//! work without committing discards every change made through it.
//!
//! Two implementations exist:
//! - [`postgres::PgReservationStore`] for the running server
//! - `memory::MemoryStore` for tests, serialized by a `tokio::sync::Mutex`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::reservation::{BookingWindow, Reservation};
use crate::models::restaurant::Table;
use crate::services::availability::CapacityPolicy;

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Fields of a reservation about to be inserted.
///
/// `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub table_id: Uuid,
    pub reservation_time: DateTime<Utc>,
    pub duration: i32,
    pub number_of_guests: i32,
    pub special_requests: Option<String>,
}

/// Source of units of work plus the read-only queries that need none.
#[async_trait]
pub trait ReservationStore: Send + Sync + 'static {
    type Tx: UnitOfWork;

    /// Start an atomic unit of work.
    async fn begin(&self) -> Result<Self::Tx, AppError>;

    /// All reservations of a customer, latest `reservation_time` first.
    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Reservation>, AppError>;

    /// A customer's reservation, canceled or not.
    async fn get_for_customer(
        &self,
        reservation_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Reservation>, AppError>;
}

/// One atomic transaction over the catalog and the reservations.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Whether the restaurant exists.
    async fn restaurant_exists(&mut self, restaurant_id: Uuid) -> Result<bool, AppError>;

    /// Tables of a restaurant that `policy` admits for `party_size`,
    /// ordered by capacity then id.
    ///
    /// The returned tables stay locked against concurrent bookings until
    /// the unit of work ends.
    async fn list_tables(
        &mut self,
        restaurant_id: Uuid,
        party_size: i32,
        policy: CapacityPolicy,
    ) -> Result<Vec<Table>, AppError>;

    /// Whether an active reservation on `table_id`, other than `exclude`,
    /// overlaps `window`.
    async fn has_conflict(
        &mut self,
        table_id: Uuid,
        window: BookingWindow,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError>;

    /// Find a reservation by id that belongs to `customer_id` and is not
    /// canceled, locking it for the rest of the unit of work.
    async fn find_active_for_customer(
        &mut self,
        reservation_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Reservation>, AppError>;

    /// Insert a reservation.
    ///
    /// Fails with `ConflictAborted` if another active reservation holds
    /// the same (table, reservation_time).
    async fn insert_reservation(&mut self, new: NewReservation) -> Result<Reservation, AppError>;

    /// Persist the mutable fields of an existing reservation: time,
    /// duration, table, guest count, special requests and `canceled`.
    ///
    /// Fails with `ConflictAborted` like `insert_reservation`.
    async fn save_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<Reservation, AppError>;

    /// Make every change durable.
    async fn commit(self) -> Result<(), AppError>;

    /// Discard every change.
    async fn rollback(self) -> Result<(), AppError>;
}
