//! PostgreSQL implementation of the booking store.
//!
//! # Concurrency
//!
//! Candidate tables are read with `FOR UPDATE`, so two transactions trying
//! to book tables of the same restaurant and size queue up behind each
//! other and the second one sees the first one's reservation once it gets
//! the lock. The partial unique index on (table_id, reservation_time) for
//! active rows catches anything that slips past; its violation becomes
//! `AppError::ConflictAborted`.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::{NewReservation, ReservationStore, UnitOfWork};
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::models::reservation::{BookingWindow, Reservation};
use crate::models::restaurant::Table;
use crate::services::availability::CapacityPolicy;

/// Booking store backed by the application's connection pool.
#[derive(Debug, Clone)]
pub struct PgReservationStore {
    pool: DbPool,
}

impl PgReservationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// A running PostgreSQL transaction. Rolled back on drop unless committed.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

/// Map a write error, turning constraint races into a business outcome.
fn write_error(error: sqlx::Error) -> AppError {
    if db::is_uniqueness_violation(&error) {
        tracing::warn!("Reservation write lost a race on (table, reservation_time)");
        AppError::ConflictAborted
    } else {
        AppError::Database(error)
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    type Tx = PgUnitOfWork;

    async fn begin(&self) -> Result<Self::Tx, AppError> {
        let tx = self.pool.begin().await?;
        Ok(PgUnitOfWork { tx })
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Reservation>, AppError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE customer_id = $1
            ORDER BY reservation_time DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    async fn get_for_customer(
        &self,
        reservation_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Reservation>, AppError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 AND customer_id = $2",
        )
        .bind(reservation_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(reservation)
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn restaurant_exists(&mut self, restaurant_id: Uuid) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM restaurants WHERE id = $1)")
                .bind(restaurant_id)
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(exists)
    }

    async fn list_tables(
        &mut self,
        restaurant_id: Uuid,
        party_size: i32,
        policy: CapacityPolicy,
    ) -> Result<Vec<Table>, AppError> {
        // FOR UPDATE serializes bookings competing for the same tables
        let sql = format!(
            r#"
            SELECT id, restaurant_id, table_number, capacity, is_outdoor, is_available
            FROM restaurant_tables
            WHERE restaurant_id = $1 AND {}
            ORDER BY capacity ASC, id ASC
            FOR UPDATE
            "#,
            policy.sql_predicate()
        );

        let tables = sqlx::query_as::<_, Table>(&sql)
            .bind(restaurant_id)
            .bind(party_size)
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(tables)
    }

    async fn has_conflict(
        &mut self,
        table_id: Uuid,
        window: BookingWindow,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError> {
        let conflict: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE table_id = $1
                  AND NOT canceled
                  AND reservation_time < $3
                  AND reservation_time + make_interval(mins => duration) > $2
                  AND ($4::uuid IS NULL OR id <> $4)
            )
            "#,
        )
        .bind(table_id)
        .bind(window.start)
        .bind(window.end)
        .bind(exclude)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(conflict)
    }

    async fn find_active_for_customer(
        &mut self,
        reservation_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Reservation>, AppError> {
        // One predicate covers "missing", "not yours" and "already canceled"
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE id = $1 AND customer_id = $2 AND NOT canceled
            FOR UPDATE
            "#,
        )
        .bind(reservation_id)
        .bind(customer_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(reservation)
    }

    async fn insert_reservation(&mut self, new: NewReservation) -> Result<Reservation, AppError> {
        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (
                customer_id,
                restaurant_id,
                table_id,
                reservation_time,
                duration,
                number_of_guests,
                special_requests
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(new.customer_id)
        .bind(new.restaurant_id)
        .bind(new.table_id)
        .bind(new.reservation_time)
        .bind(new.duration)
        .bind(new.number_of_guests)
        .bind(new.special_requests)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_error)
    }

    async fn save_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<Reservation, AppError> {
        sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET reservation_time = $2,
                duration = $3,
                table_id = $4,
                number_of_guests = $5,
                special_requests = $6,
                canceled = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(reservation.id)
        .bind(reservation.reservation_time)
        .bind(reservation.duration)
        .bind(reservation.table_id)
        .bind(reservation.number_of_guests)
        .bind(&reservation.special_requests)
        .bind(reservation.canceled)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(write_error)
    }

    async fn commit(self) -> Result<(), AppError> {
        self.tx.commit().await.map_err(write_error)
    }

    async fn rollback(self) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
