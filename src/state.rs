//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::{
    db::DbPool,
    services::{availability::CapacityPolicy, reservation_service::ReservationService},
    store::postgres::PgReservationStore,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub reservations: Arc<ReservationService<PgReservationStore>>,
}

impl AppState {
    pub fn new(pool: DbPool, policy: CapacityPolicy) -> Self {
        let store = PgReservationStore::new(pool.clone());
        Self {
            pool,
            reservations: Arc::new(ReservationService::new(store, policy)),
        }
    }
}
