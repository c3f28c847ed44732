//! Restaurant catalog HTTP handlers.
//!
//! - GET /api/v1/restaurants - List restaurants with tables and hours
//! - POST /api/v1/restaurants - Create restaurant (owners)
//! - GET /api/v1/restaurants/{id} - Restaurant details
//! - PUT /api/v1/restaurants/{id} - Update restaurant (its owner)
//! - DELETE /api/v1/restaurants/{id} - Delete restaurant (its owner)
//! - POST /api/v1/restaurants/{id}/tables - Add table (its owner)
//! - PUT /api/v1/restaurants/{id}/tables/{table_id} - Edit table (its owner)
//!
//! Customers may read the catalog but get 403 on every write.

use crate::{
    error::AppError,
    handlers::extract::JsonBody,
    middleware::auth::AuthContext,
    models::restaurant::{
        CreateRestaurantRequest, RestaurantResponse, Table, TableInput, UpdateRestaurantRequest,
        UpdateTableRequest,
    },
    services::restaurant_service,
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

pub async fn list_restaurants(
    State(state): State<AppState>,
) -> Result<Json<Vec<RestaurantResponse>>, AppError> {
    let restaurants = restaurant_service::list_restaurants(&state.pool).await?;
    Ok(Json(restaurants))
}

pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<Json<RestaurantResponse>, AppError> {
    let restaurant = restaurant_service::get_restaurant(&state.pool, restaurant_id).await?;
    Ok(Json(restaurant))
}

/// Create a restaurant with its opening hours and tables.
///
/// # Response
///
/// - **Success (201 Created)**: The restaurant with nested catalog
/// - **Error (400)**: Validation failed (e.g. open time after close time)
/// - **Error (403)**: Caller is not an owner
pub async fn create_restaurant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(request): JsonBody<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<RestaurantResponse>), AppError> {
    auth.require_owner()?;

    let restaurant =
        restaurant_service::create_restaurant(&state.pool, auth.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(restaurant)))
}

pub async fn update_restaurant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(restaurant_id): Path<Uuid>,
    JsonBody(request): JsonBody<UpdateRestaurantRequest>,
) -> Result<Json<RestaurantResponse>, AppError> {
    auth.require_owner()?;

    let restaurant =
        restaurant_service::update_restaurant(&state.pool, auth.user_id, restaurant_id, request)
            .await?;

    Ok(Json(restaurant))
}

/// Delete a restaurant.
///
/// Returns 204 No Content, or 409 if the restaurant has reservations.
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(restaurant_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_owner()?;

    restaurant_service::delete_restaurant(&state.pool, auth.user_id, restaurant_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_table(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(restaurant_id): Path<Uuid>,
    JsonBody(request): JsonBody<TableInput>,
) -> Result<(StatusCode, Json<Table>), AppError> {
    auth.require_owner()?;

    let table =
        restaurant_service::add_table(&state.pool, auth.user_id, restaurant_id, request).await?;

    Ok((StatusCode::CREATED, Json(table)))
}

pub async fn update_table(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((restaurant_id, table_id)): Path<(Uuid, Uuid)>,
    JsonBody(request): JsonBody<UpdateTableRequest>,
) -> Result<Json<Table>, AppError> {
    auth.require_owner()?;

    let table = restaurant_service::update_table(
        &state.pool,
        auth.user_id,
        restaurant_id,
        table_id,
        request,
    )
    .await?;

    Ok(Json(table))
}
