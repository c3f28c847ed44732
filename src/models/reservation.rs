//! Reservation data models and API request/response types.
//!
//! This module defines:
//! - `Reservation`: Database entity representing a booking
//! - `BookingWindow`: The half-open time interval a booking occupies
//! - Request types for creating and updating reservations
//! - `ReservationResponse`: Response body returned to clients

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents a reservation record from the database.
///
/// # Database Table
///
/// Maps to the `reservations` table. A reservation:
/// - Is bound to the customer who created it, for good
/// - Occupies `[reservation_time, reservation_time + duration)` on one table
/// - Is never deleted; `canceled` marks it permanently inactive
///
/// Among active rows, (table_id, reservation_time) is unique.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct Reservation {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,

    /// Assigned by the availability search, never by the client
    pub table_id: Uuid,

    pub reservation_time: DateTime<Utc>,

    /// Length in minutes
    pub duration: i32,

    pub number_of_guests: i32,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub canceled: bool,
}

#[cfg(test)]
impl Reservation {
    /// Interval this reservation occupies on its table.
    pub fn window(&self) -> BookingWindow {
        BookingWindow::new(self.reservation_time, self.duration)
            .expect("stored reservations end within range")
    }

    pub fn is_active(&self) -> bool {
        !self.canceled
    }
}

/// Longest booking accepted, in minutes.
pub const MAX_DURATION_MINUTES: i32 = 24 * 60;

/// Half-open interval `[start, end)` occupied by a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingWindow {
    /// `None` when the end falls outside the representable date range.
    pub fn new(start: DateTime<Utc>, duration_minutes: i32) -> Option<Self> {
        let end = start.checked_add_signed(Duration::minutes(i64::from(duration_minutes)))?;
        Some(Self { start, end })
    }

    /// Two windows overlap when they share at least one instant.
    ///
    /// Back-to-back windows (one ends exactly when the other starts) do not.
    #[cfg(test)]
    pub fn overlaps(&self, other: &BookingWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Request to book a table.
///
/// The table is chosen by the server; clients cannot name one.
///
/// # JSON Example
///
/// ```json
/// {
///   "restaurant_id": "550e8400-e29b-41d4-a716-446655440000",
///   "reservation_time": "2025-06-01T18:00:00Z",
///   "duration": 90,
///   "number_of_guests": 4,
///   "special_requests": "Window seat"
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_booking_window"))]
pub struct CreateReservationRequest {
    pub restaurant_id: Uuid,

    pub reservation_time: DateTime<Utc>,

    /// Length in minutes, at most a day
    #[validate(range(
        min = 1,
        max = MAX_DURATION_MINUTES,
        message = "Duration must be between 1 and 1440 minutes"
    ))]
    pub duration: i32,

    #[validate(range(min = 1, message = "Number of guests must be positive"))]
    pub number_of_guests: i32,

    pub special_requests: Option<String>,
}

fn validate_booking_window(request: &CreateReservationRequest) -> Result<(), ValidationError> {
    if BookingWindow::new(request.reservation_time, request.duration).is_some() {
        return Ok(());
    }

    let mut error = ValidationError::new("reservation_time_out_of_range");
    error.message = Some("Reservation ends outside the supported date range".into());
    Err(error)
}

/// Partial update of a reservation. Omitted fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateReservationRequest {
    pub reservation_time: Option<DateTime<Utc>>,

    #[validate(range(
        min = 1,
        max = MAX_DURATION_MINUTES,
        message = "Duration must be between 1 and 1440 minutes"
    ))]
    pub duration: Option<i32>,

    #[validate(range(min = 1, message = "Number of guests must be positive"))]
    pub number_of_guests: Option<i32>,

    pub special_requests: Option<String>,
}

/// Response returned for reservation operations.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "770e8400-e29b-41d4-a716-446655440002",
///   "restaurant_id": "550e8400-e29b-41d4-a716-446655440000",
///   "table_id": "660e8400-e29b-41d4-a716-446655440001",
///   "reservation_time": "2025-06-01T18:00:00Z",
///   "duration": 90,
///   "number_of_guests": 4,
///   "special_requests": "Window seat",
///   "created_at": "2025-05-20T10:00:00Z",
///   "canceled": false
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ReservationResponse {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub table_id: Uuid,
    pub reservation_time: DateTime<Utc>,
    pub duration: i32,
    pub number_of_guests: i32,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub canceled: bool,
}

/// Convert database Reservation to API ReservationResponse.
///
/// Drops `customer_id`: the caller is always the customer.
impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            restaurant_id: reservation.restaurant_id,
            table_id: reservation.table_id,
            reservation_time: reservation.reservation_time,
            duration: reservation.duration,
            number_of_guests: reservation.number_of_guests,
            special_requests: reservation.special_requests,
            created_at: reservation.created_at,
            canceled: reservation.canceled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn window_end_is_start_plus_duration() {
        let window = BookingWindow::new(at(18, 0), 90).unwrap();
        assert_eq!(window.end, at(19, 30));
    }

    #[test]
    fn overlapping_windows_conflict() {
        let existing = BookingWindow::new(at(18, 0), 60).unwrap();
        let requested = BookingWindow::new(at(18, 30), 60).unwrap();

        assert!(existing.overlaps(&requested));
        assert!(requested.overlaps(&existing));
    }

    #[test]
    fn back_to_back_windows_do_not_conflict() {
        let existing = BookingWindow::new(at(18, 0), 60).unwrap();
        let next = BookingWindow::new(at(19, 0), 60).unwrap();
        let previous = BookingWindow::new(at(17, 0), 60).unwrap();

        assert!(!existing.overlaps(&next));
        assert!(!existing.overlaps(&previous));
    }

    #[test]
    fn contained_window_conflicts() {
        let existing = BookingWindow::new(at(18, 0), 180).unwrap();
        let inner = BookingWindow::new(at(19, 0), 30).unwrap();

        assert!(existing.overlaps(&inner));
        assert!(inner.overlaps(&existing));
    }

    #[test]
    fn client_cannot_pick_table_or_customer() {
        // Unknown fields are ignored rather than honoured.
        let request: CreateReservationRequest = serde_json::from_value(json!({
            "restaurant_id": Uuid::new_v4(),
            "reservation_time": "2025-06-01T18:00:00Z",
            "duration": 60,
            "number_of_guests": 2,
            "table_id": Uuid::new_v4(),
            "customer_id": Uuid::new_v4()
        }))
        .unwrap();

        assert_eq!(request.number_of_guests, 2);
    }

    #[test]
    fn non_positive_duration_and_party_are_rejected() {
        let request = CreateReservationRequest {
            restaurant_id: Uuid::new_v4(),
            reservation_time: at(18, 0),
            duration: 0,
            number_of_guests: -1,
            special_requests: None,
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("duration"));
        assert!(fields.contains_key("number_of_guests"));
    }

    #[test]
    fn window_past_the_calendar_end_is_none() {
        assert!(BookingWindow::new(DateTime::<Utc>::MAX_UTC, 1).is_none());
    }

    #[test]
    fn far_future_booking_fails_validation_instead_of_panicking() {
        let request = CreateReservationRequest {
            restaurant_id: Uuid::new_v4(),
            reservation_time: DateTime::<Utc>::MAX_UTC - Duration::minutes(30),
            duration: 60,
            number_of_guests: 2,
            special_requests: None,
        };

        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("__all__"));
    }

    #[test]
    fn duration_longer_than_a_day_is_rejected() {
        let request = CreateReservationRequest {
            restaurant_id: Uuid::new_v4(),
            reservation_time: at(18, 0),
            duration: i32::MAX,
            number_of_guests: 2,
            special_requests: None,
        };
        assert!(request.validate().unwrap_err().field_errors().contains_key("duration"));

        let update = UpdateReservationRequest {
            duration: Some(MAX_DURATION_MINUTES + 1),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn empty_update_is_valid() {
        assert!(UpdateReservationRequest::default().validate().is_ok());
    }
}
