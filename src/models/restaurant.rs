//! Restaurant catalog models: restaurants, their tables and opening hours.
//!
//! This module defines:
//! - `Restaurant`, `Table`, `OpeningHour`: Database entities
//! - Request types for creating and editing the catalog
//! - `RestaurantResponse`: A restaurant with its tables and hours

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents a restaurant record from the database.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Restaurant {
    pub id: Uuid,

    /// User (with the owner role) that manages this restaurant
    pub owner_id: Uuid,

    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A bookable table.
///
/// # Database Table
///
/// Maps to the `restaurant_tables` table. The booking core only reads
/// `capacity` and `restaurant_id`; the flags are informational.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct Table {
    pub id: Uuid,
    pub restaurant_id: Uuid,

    /// Label shown to staff, e.g. "T4" or "Patio 2"
    pub table_number: String,

    /// Seats at this table
    pub capacity: i32,

    pub is_outdoor: bool,
    pub is_available: bool,
}

/// Weekly opening window for one day.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct OpeningHour {
    pub id: Uuid,
    pub restaurant_id: Uuid,

    /// Three-letter lowercase day: `mon` .. `sun`
    pub day: String,

    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
    pub is_closed: bool,
}

/// Day of week as accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Day {
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Mon => "mon",
            Day::Tue => "tue",
            Day::Wed => "wed",
            Day::Thu => "thu",
            Day::Fri => "fri",
            Day::Sat => "sat",
            Day::Sun => "sun",
        }
    }
}

/// Opening hours entry in a create/update request.
///
/// # JSON Example
///
/// ```json
/// { "day": "fri", "open_time": "17:00:00", "close_time": "23:00:00" }
/// ```
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_opening_window"))]
pub struct OpeningHourInput {
    pub day: Day,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,

    #[serde(default)]
    pub is_closed: bool,
}

fn validate_opening_window(hour: &OpeningHourInput) -> Result<(), ValidationError> {
    if hour.open_time >= hour.close_time {
        let mut error = ValidationError::new("open_before_close");
        error.message = Some("Open time must be before close time.".into());
        return Err(error);
    }
    Ok(())
}

/// Table entry in a create request, or the body of an add-table request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TableInput {
    #[validate(length(min = 1, max = 10))]
    pub table_number: String,

    #[validate(range(min = 1, message = "Capacity must be positive"))]
    pub capacity: i32,

    #[serde(default)]
    pub is_outdoor: bool,

    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

/// Edit a table's presentation flags.
///
/// Capacity is fixed once a table exists: existing reservations were
/// matched against it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTableRequest {
    #[validate(length(min = 1, max = 10))]
    pub table_number: Option<String>,
    pub is_outdoor: Option<bool>,
    pub is_available: Option<bool>,
}

/// Request body for creating a restaurant together with its tables and hours.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Chez Nous",
///   "address": "1 Rue de la Paix",
///   "phone_number": "+3311111111",
///   "opening_hours": [{ "day": "fri", "open_time": "17:00:00", "close_time": "23:00:00" }],
///   "tables": [{ "table_number": "T1", "capacity": 4 }]
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRestaurantRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub address: String,

    #[validate(length(max = 15))]
    pub phone_number: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub opening_hours: Vec<OpeningHourInput>,

    #[serde(default)]
    #[validate(nested)]
    pub tables: Vec<TableInput>,
}

/// Request body for updating a restaurant.
///
/// When `opening_hours` is present it replaces the existing set.
/// Tables are edited through their own endpoints so reservations keep
/// pointing at the table they were booked on.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRestaurantRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 255))]
    pub address: String,

    #[validate(length(max = 15))]
    pub phone_number: Option<String>,

    #[validate(nested)]
    pub opening_hours: Option<Vec<OpeningHourInput>>,
}

/// Restaurant with its catalog, as returned to clients.
#[derive(Debug, Serialize)]
pub struct RestaurantResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub opening_hours: Vec<OpeningHour>,
    pub tables: Vec<Table>,
}

impl RestaurantResponse {
    pub fn new(
        restaurant: Restaurant,
        opening_hours: Vec<OpeningHour>,
        tables: Vec<Table>,
    ) -> Self {
        Self {
            id: restaurant.id,
            owner_id: restaurant.owner_id,
            name: restaurant.name,
            address: restaurant.address,
            phone_number: restaurant.phone_number,
            created_at: restaurant.created_at,
            opening_hours,
            tables,
        }
    }
}
