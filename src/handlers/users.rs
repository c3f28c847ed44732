//! User HTTP handlers.
//!
//! - POST /api/v1/users/register - Register an owner or customer (public)
//! - GET /api/v1/users/me - Current user

use crate::{
    error::AppError,
    handlers::extract::JsonBody,
    middleware::auth::AuthContext,
    models::user::{RegisterUserRequest, RegisteredUserResponse, UserResponse},
    services::user_service,
    state::AppState,
};
use axum::{Extension, Json, extract::State, http::StatusCode};

/// Register a new user.
///
/// # Request Body
///
/// ```json
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "role": "customer",
///   "phone_number": "+15550100"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: The user and its API key. The key is only shown here.
/// - **Error (400)**: Validation failed
/// - **Error (409)**: Username or email already registered
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterUserRequest>,
) -> Result<(StatusCode, Json<RegisteredUserResponse>), AppError> {
    let (user, api_key) = user_service::register_user(&state.pool, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUserResponse {
            user: user.into(),
            api_key,
        }),
    ))
}

/// Get the authenticated user.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service::get_user_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(username = %auth.username, "Authenticated user vanished");
            AppError::InvalidApiKey
        })?;

    Ok(Json(user.into()))
}
