//! Reservation HTTP handlers.
//!
//! This module implements the booking endpoints:
//! - POST /api/v1/reservations - Book a table
//! - GET /api/v1/reservations - List own reservations
//! - GET /api/v1/reservations/{id} - Get own reservation
//! - PUT /api/v1/reservations/{id} - Move/resize own reservation
//! - POST /api/v1/reservations/{id}/cancel - Cancel own reservation
//!
//! The customer is always the authenticated user and the table is always
//! chosen by the server.

use crate::{
    error::AppError,
    handlers::extract::JsonBody,
    middleware::auth::AuthContext,
    models::reservation::{
        CreateReservationRequest, ReservationResponse, UpdateReservationRequest,
    },
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Book a table.
///
/// # Request Body
///
/// ```json
/// {
///   "restaurant_id": "550e8400-...",
///   "reservation_time": "2025-06-01T18:00:00Z",
///   "duration": 60,
///   "number_of_guests": 4
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The reservation with its assigned table
/// - **Error (400)**: Validation failed
/// - **Error (404)**: Restaurant not found
/// - **Error (409)**: No table available
pub async fn create_reservation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(request): JsonBody<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    let reservation = state.reservations.create(auth.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(reservation.into())))
}

/// Update a reservation. Omitted fields keep their values.
///
/// Returns 404 if the reservation is missing, canceled, or someone else's.
pub async fn update_reservation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(reservation_id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateReservationRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state
        .reservations
        .update(reservation_id, auth.user_id, request)
        .await?;

    Ok(Json(reservation.into()))
}

/// Cancel a reservation.
///
/// A second cancel returns 404.
pub async fn cancel_reservation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state
        .reservations
        .cancel(reservation_id, auth.user_id)
        .await?;

    Ok(Json(reservation.into()))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ReservationResponse>>, AppError> {
    let reservations = state.reservations.list_for_customer(auth.user_id).await?;

    Ok(Json(reservations.into_iter().map(Into::into).collect()))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state
        .reservations
        .get_for_customer(reservation_id, auth.user_id)
        .await?;

    Ok(Json(reservation.into()))
}
