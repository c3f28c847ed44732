//! Reservation service - Core business logic for table bookings.
//!
//! This service handles:
//! - Input validation before any store access
//! - Table assignment through the availability search
//! - Ownership-scoped updates and cancellations
//! - Unit-of-work management (commit on success, rollback otherwise)
//!
//! # Atomicity Guarantees
//!
//! Each operation runs its availability scan and its write inside one
//! unit of work. Either the reservation change is durable or nothing
//! changed.

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::reservation::{CreateReservationRequest, Reservation, UpdateReservationRequest},
    services::availability::{CapacityPolicy, find_available_table},
    store::{NewReservation, ReservationStore, UnitOfWork},
};

/// Books, moves and cancels reservations.
///
/// The store and the capacity policy are fixed at construction.
#[derive(Debug, Clone)]
pub struct ReservationService<S> {
    store: S,
    policy: CapacityPolicy,
}

impl<S: ReservationStore> ReservationService<S> {
    pub fn new(store: S, policy: CapacityPolicy) -> Self {
        Self { store, policy }
    }

    /// Book a table for a customer.
    ///
    /// # Process
    ///
    /// 1. Validate duration and party size
    /// 2. Start unit of work
    /// 3. Check the restaurant exists
    /// 4. Search for a free table (no exclusion)
    /// 5. Insert the reservation and commit
    ///
    /// # Errors
    ///
    /// - `Validation`: Non-positive duration or guest count
    /// - `RestaurantNotFound`: Restaurant doesn't exist
    /// - `NoAvailability`: No candidate table is free
    /// - `ConflictAborted`: A concurrent booking took the table first
    /// - `Database`: Database error occurred
    pub async fn create(
        &self,
        customer_id: Uuid,
        request: CreateReservationRequest,
    ) -> Result<Reservation, AppError> {
        request.validate()?;

        let mut tx = self.store.begin().await?;

        if !tx.restaurant_exists(request.restaurant_id).await? {
            tx.rollback().await?;
            return Err(AppError::RestaurantNotFound);
        }

        let Some(table) = find_available_table(
            &mut tx,
            self.policy,
            request.restaurant_id,
            request.reservation_time,
            request.duration,
            request.number_of_guests,
            None,
        )
        .await?
        else {
            tx.rollback().await?;
            tracing::info!(
                restaurant_id = %request.restaurant_id,
                reservation_time = %request.reservation_time,
                party_size = request.number_of_guests,
                "No table available"
            );
            return Err(AppError::NoAvailability);
        };

        let reservation = tx
            .insert_reservation(NewReservation {
                customer_id,
                restaurant_id: request.restaurant_id,
                table_id: table.id,
                reservation_time: request.reservation_time,
                duration: request.duration,
                number_of_guests: request.number_of_guests,
                special_requests: request.special_requests,
            })
            .await?;

        tx.commit().await?;

        tracing::info!(
            reservation_id = %reservation.id,
            table_id = %reservation.table_id,
            "Reservation created"
        );
        Ok(reservation)
    }

    /// Move or resize a customer's active reservation.
    ///
    /// Fields missing from `changes` keep their current values. The
    /// reservation's own booking is ignored while searching, so it can
    /// stay on its table when shifted within its current slot.
    ///
    /// # Errors
    ///
    /// - `Validation`: Non-positive duration or guest count
    /// - `ReservationNotFound`: Missing, not the caller's, or canceled
    /// - `NoAvailability` / `ConflictAborted`: Stored reservation is left unchanged
    /// - `Database`: Database error occurred
    pub async fn update(
        &self,
        reservation_id: Uuid,
        customer_id: Uuid,
        changes: UpdateReservationRequest,
    ) -> Result<Reservation, AppError> {
        changes.validate()?;

        let mut tx = self.store.begin().await?;

        let Some(mut reservation) = tx
            .find_active_for_customer(reservation_id, customer_id)
            .await?
        else {
            tx.rollback().await?;
            return Err(AppError::ReservationNotFound);
        };

        let reservation_time = changes
            .reservation_time
            .unwrap_or(reservation.reservation_time);
        let duration = changes.duration.unwrap_or(reservation.duration);
        let number_of_guests = changes
            .number_of_guests
            .unwrap_or(reservation.number_of_guests);

        let Some(table) = find_available_table(
            &mut tx,
            self.policy,
            reservation.restaurant_id,
            reservation_time,
            duration,
            number_of_guests,
            Some(reservation.id),
        )
        .await?
        else {
            tx.rollback().await?;
            tracing::info!(%reservation_id, "No table available for updated reservation");
            return Err(AppError::NoAvailability);
        };

        reservation.reservation_time = reservation_time;
        reservation.duration = duration;
        reservation.table_id = table.id;
        reservation.number_of_guests = number_of_guests;
        if let Some(special_requests) = changes.special_requests {
            reservation.special_requests = Some(special_requests);
        }

        let updated = tx.save_reservation(&reservation).await?;
        tx.commit().await?;

        tracing::info!(%reservation_id, table_id = %updated.table_id, "Reservation updated");
        Ok(updated)
    }

    /// Cancel a customer's active reservation.
    ///
    /// Canceling twice is reported as `ReservationNotFound` the second time.
    pub async fn cancel(
        &self,
        reservation_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Reservation, AppError> {
        let mut tx = self.store.begin().await?;

        let Some(mut reservation) = tx
            .find_active_for_customer(reservation_id, customer_id)
            .await?
        else {
            tx.rollback().await?;
            return Err(AppError::ReservationNotFound);
        };

        reservation.canceled = true;
        let canceled = tx.save_reservation(&reservation).await?;
        tx.commit().await?;

        tracing::info!(%reservation_id, "Reservation canceled");
        Ok(canceled)
    }

    /// All of a customer's reservations, latest first.
    pub async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Reservation>, AppError> {
        self.store.list_for_customer(customer_id).await
    }

    /// One of the customer's reservations, including canceled ones.
    pub async fn get_for_customer(
        &self,
        reservation_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Reservation, AppError> {
        self.store
            .get_for_customer(reservation_id, customer_id)
            .await?
            .ok_or(AppError::ReservationNotFound)
    }
}
