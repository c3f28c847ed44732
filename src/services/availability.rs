//! Availability search: which table, if any, can take a booking.
//!
//! # Algorithm
//!
//! 1. Turn the requested start and duration into a half-open window
//! 2. Fetch the restaurant's candidate tables, smallest capacity first
//! 3. Return the first table with no overlapping active reservation
//!
//! Every candidate is tried; a conflict on one table never ends the search.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::reservation::BookingWindow;
use crate::models::restaurant::Table;
use crate::store::UnitOfWork;

/// Which tables may seat a party.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Only tables whose capacity equals the party size.
    ///
    /// A party of 3 cannot book a table for 4 under this policy.
    #[default]
    Exact,

    /// Any table with at least as many seats as guests.
    AtLeast,
}

impl CapacityPolicy {
    /// Whether a table with `capacity` seats is a candidate for `party_size` guests.
    #[cfg(test)]
    pub fn admits(&self, capacity: i32, party_size: i32) -> bool {
        match self {
            CapacityPolicy::Exact => capacity == party_size,
            CapacityPolicy::AtLeast => capacity >= party_size,
        }
    }

    /// The same predicate over `capacity`, with the party size bound as `$2`.
    pub(crate) fn sql_predicate(&self) -> &'static str {
        match self {
            CapacityPolicy::Exact => "capacity = $2",
            CapacityPolicy::AtLeast => "capacity >= $2",
        }
    }
}

/// Find a free table for a party.
///
/// # Arguments
///
/// * `uow` - Unit of work the search runs in; candidate tables stay locked in it
/// * `policy` - Capacity matching policy
/// * `restaurant_id` - Restaurant to search
/// * `requested_time` - Start of the booking
/// * `duration` - Length in minutes (already validated as 1..=1440)
/// * `party_size` - Number of guests (already validated as positive)
/// * `exclude_reservation_id` - Reservation to ignore, used when a booking is moved
///
/// # Returns
///
/// The first free candidate, or `None` if every candidate is taken or the
/// restaurant has no candidate table at all. `InvalidRequest` if the booking
/// would end past the last representable instant.
pub async fn find_available_table<U: UnitOfWork>(
    uow: &mut U,
    policy: CapacityPolicy,
    restaurant_id: Uuid,
    requested_time: DateTime<Utc>,
    duration: i32,
    party_size: i32,
    exclude_reservation_id: Option<Uuid>,
) -> Result<Option<Table>, AppError> {
    let window = BookingWindow::new(requested_time, duration).ok_or_else(|| {
        AppError::InvalidRequest("Reservation ends outside the supported date range".into())
    })?;

    let candidates = uow.list_tables(restaurant_id, party_size, policy).await?;
    if candidates.is_empty() {
        tracing::debug!(%restaurant_id, party_size, "No candidate tables");
        return Ok(None);
    }

    for table in candidates {
        if !uow
            .has_conflict(table.id, window, exclude_reservation_id)
            .await?
        {
            return Ok(Some(table));
        }
        tracing::debug!(table_id = %table.id, "Candidate table already booked");
    }

    Ok(None)
}
