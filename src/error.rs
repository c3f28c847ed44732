//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Business outcomes (not found, no availability, lost booking race) are
/// ordinary variants so services can return them as typed results. Only
/// `Database` represents an unexpected failure.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Invalid or missing API keys, wrong role
/// - **Resource Errors**: Requested resources not found
/// - **Booking Outcomes**: No table free, or a concurrent booking won
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// API key is missing, invalid, or belongs to an inactive user.
    ///
    /// Returns HTTP 401 Unauthorized.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Authenticated user lacks the role required for the operation.
    ///
    /// Returns HTTP 403 Forbidden.
    #[error("Only restaurant owners may perform this action")]
    OwnerRequired,

    /// Requested restaurant does not exist or is not managed by the caller.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Restaurant not found")]
    RestaurantNotFound,

    /// Requested table does not exist in the given restaurant.
    #[error("Table not found")]
    TableNotFound,

    /// Reservation does not exist, belongs to someone else, or is canceled.
    ///
    /// The three cases are deliberately indistinguishable to the caller.
    #[error("Reservation not found")]
    ReservationNotFound,

    /// No table can seat the party for the requested window.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("No table available for the requested time")]
    NoAvailability,

    /// A concurrent booking claimed the table between our check and our write.
    ///
    /// Reported to clients exactly like `NoAvailability`.
    #[error("Booking conflicted with a concurrent reservation")]
    ConflictAborted,

    /// Username or email already registered.
    #[error("User already exists")]
    UserAlreadyExists,

    /// Restaurant still has reservations referencing it.
    #[error("Restaurant has reservations and cannot be deleted")]
    RestaurantInUse,

    /// Request body is malformed or describes an impossible booking.
    ///
    /// Returns HTTP 400 Bad Request with the same code as `Validation`.
    /// The String contains details about what was invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Field-level validation failed.
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "invalid_api_key"),
            AppError::OwnerRequired => (StatusCode::FORBIDDEN, "owner_required"),
            AppError::RestaurantNotFound => (StatusCode::NOT_FOUND, "restaurant_not_found"),
            AppError::TableNotFound => (StatusCode::NOT_FOUND, "table_not_found"),
            AppError::ReservationNotFound => (StatusCode::NOT_FOUND, "reservation_not_found"),
            AppError::NoAvailability | AppError::ConflictAborted => {
                (StatusCode::CONFLICT, "no_table_available")
            }
            AppError::UserAlreadyExists => (StatusCode::CONFLICT, "user_already_exists"),
            AppError::RestaurantInUse => (StatusCode::CONFLICT, "restaurant_in_use"),
            AppError::InvalidRequest(_) | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "validation_error")
            }
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

/// Body extraction failures (missing field, wrong type, bad content type).
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Validation errors additionally carry a `fields` object keyed by field name.
/// `ConflictAborted` uses the same code as `NoAvailability`, and database
/// errors never leak their details.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = match self {
            AppError::Database(ref e) => {
                tracing::error!(error = ?e, "Database operation failed");
                json!({
                    "error": {
                        "code": code,
                        "message": "An internal error occurred"
                    }
                })
            }
            AppError::ConflictAborted => json!({
                "error": {
                    "code": code,
                    "message": AppError::NoAvailability.to_string()
                }
            }),
            AppError::InvalidRequest(ref msg) => json!({
                "error": {
                    "code": code,
                    "message": msg
                }
            }),
            AppError::Validation(ref errors) => json!({
                "error": {
                    "code": code,
                    "message": self.to_string(),
                    "fields": errors
                }
            }),
            _ => json!({
                "error": {
                    "code": code,
                    "message": self.to_string()
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}
