//! In-memory booking store for tests.
//!
//! A unit of work holds the store's mutex for its whole lifetime and works
//! on a private copy of the state, which replaces the shared state on
//! commit. Transactions are therefore fully serialized, and an abandoned
//! unit of work leaves nothing behind.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{NewReservation, ReservationStore, UnitOfWork};
use crate::error::AppError;
use crate::models::reservation::{BookingWindow, Reservation};
use crate::models::restaurant::Table;
use crate::services::availability::CapacityPolicy;

#[derive(Debug, Clone, Default)]
struct State {
    restaurants: Vec<Uuid>,
    tables: Vec<Table>,
    reservations: Vec<Reservation>,
}

impl State {
    /// Mirrors the partial unique index on active (table_id, reservation_time).
    fn violates_uniqueness(&self, id: Option<Uuid>, table_id: Uuid, time: DateTime<Utc>) -> bool {
        self.reservations.iter().any(|r| {
            Some(r.id) != id
                && r.is_active()
                && r.table_id == table_id
                && r.reservation_time == time
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<State>,
    staged: State,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_restaurant(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().await.restaurants.push(id);
        id
    }

    pub async fn add_table(&self, restaurant_id: Uuid, capacity: i32) -> Table {
        let mut state = self.state.lock().await;
        let table = Table {
            id: Uuid::new_v4(),
            restaurant_id,
            table_number: format!("T{}", state.tables.len() + 1),
            capacity,
            is_outdoor: false,
            is_available: true,
        };
        state.tables.push(table.clone());
        table
    }

    /// Snapshot of every stored reservation.
    pub async fn reservations(&self) -> Vec<Reservation> {
        self.state.lock().await.reservations.clone()
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    type Tx = MemoryUnitOfWork;

    async fn begin(&self) -> Result<Self::Tx, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryUnitOfWork { guard, staged })
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Reservation>, AppError> {
        let mut reservations: Vec<Reservation> = self
            .state
            .lock()
            .await
            .reservations
            .iter()
            .filter(|r| r.customer_id == customer_id)
            .cloned()
            .collect();
        reservations.sort_by(|a, b| b.reservation_time.cmp(&a.reservation_time));
        Ok(reservations)
    }

    async fn get_for_customer(
        &self,
        reservation_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Reservation>, AppError> {
        Ok(self
            .state
            .lock()
            .await
            .reservations
            .iter()
            .find(|r| r.id == reservation_id && r.customer_id == customer_id)
            .cloned())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn restaurant_exists(&mut self, restaurant_id: Uuid) -> Result<bool, AppError> {
        Ok(self.staged.restaurants.contains(&restaurant_id))
    }

    async fn list_tables(
        &mut self,
        restaurant_id: Uuid,
        party_size: i32,
        policy: CapacityPolicy,
    ) -> Result<Vec<Table>, AppError> {
        let mut tables: Vec<Table> = self
            .staged
            .tables
            .iter()
            .filter(|t| t.restaurant_id == restaurant_id && policy.admits(t.capacity, party_size))
            .cloned()
            .collect();
        tables.sort_by(|a, b| (a.capacity, a.id).cmp(&(b.capacity, b.id)));
        Ok(tables)
    }

    async fn has_conflict(
        &mut self,
        table_id: Uuid,
        window: BookingWindow,
        exclude: Option<Uuid>,
    ) -> Result<bool, AppError> {
        Ok(self.staged.reservations.iter().any(|r| {
            r.table_id == table_id
                && r.is_active()
                && Some(r.id) != exclude
                && r.window().overlaps(&window)
        }))
    }

    async fn find_active_for_customer(
        &mut self,
        reservation_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Option<Reservation>, AppError> {
        Ok(self
            .staged
            .reservations
            .iter()
            .find(|r| r.id == reservation_id && r.customer_id == customer_id && r.is_active())
            .cloned())
    }

    async fn insert_reservation(&mut self, new: NewReservation) -> Result<Reservation, AppError> {
        if self
            .staged
            .violates_uniqueness(None, new.table_id, new.reservation_time)
        {
            return Err(AppError::ConflictAborted);
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            customer_id: new.customer_id,
            restaurant_id: new.restaurant_id,
            table_id: new.table_id,
            reservation_time: new.reservation_time,
            duration: new.duration,
            number_of_guests: new.number_of_guests,
            special_requests: new.special_requests,
            created_at: Utc::now(),
            canceled: false,
        };
        self.staged.reservations.push(reservation.clone());
        Ok(reservation)
    }

    async fn save_reservation(
        &mut self,
        reservation: &Reservation,
    ) -> Result<Reservation, AppError> {
        if reservation.is_active()
            && self.staged.violates_uniqueness(
                Some(reservation.id),
                reservation.table_id,
                reservation.reservation_time,
            )
        {
            return Err(AppError::ConflictAborted);
        }

        let stored = self
            .staged
            .reservations
            .iter_mut()
            .find(|r| r.id == reservation.id)
            .ok_or(AppError::ReservationNotFound)?;

        stored.reservation_time = reservation.reservation_time;
        stored.duration = reservation.duration;
        stored.table_id = reservation.table_id;
        stored.number_of_guests = reservation.number_of_guests;
        stored.special_requests = reservation.special_requests.clone();
        stored.canceled = reservation.canceled;
        Ok(stored.clone())
    }

    async fn commit(self) -> Result<(), AppError> {
        let MemoryUnitOfWork { mut guard, staged } = self;
        *guard = staged;
        Ok(())
    }

    async fn rollback(self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_reservation(restaurant_id: Uuid, table_id: Uuid) -> NewReservation {
        NewReservation {
            customer_id: Uuid::new_v4(),
            restaurant_id,
            table_id,
            reservation_time: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
            duration: 60,
            number_of_guests: 4,
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn duplicate_active_table_time_is_rejected() {
        let store = MemoryStore::new();
        let restaurant = store.add_restaurant().await;
        let table = store.add_table(restaurant, 4).await;

        let mut uow = store.begin().await.unwrap();
        uow.insert_reservation(new_reservation(restaurant, table.id))
            .await
            .unwrap();
        let second = uow
            .insert_reservation(new_reservation(restaurant, table.id))
            .await;

        assert!(matches!(second, Err(AppError::ConflictAborted)));
    }

    #[tokio::test]
    async fn uncommitted_work_is_discarded() {
        let store = MemoryStore::new();
        let restaurant = store.add_restaurant().await;
        let table = store.add_table(restaurant, 4).await;

        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_reservation(new_reservation(restaurant, table.id))
                .await
                .unwrap();
        }
        assert!(store.reservations().await.is_empty());

        let mut uow = store.begin().await.unwrap();
        uow.insert_reservation(new_reservation(restaurant, table.id))
            .await
            .unwrap();
        uow.commit().await.unwrap();
        assert_eq!(store.reservations().await.len(), 1);
    }
}
