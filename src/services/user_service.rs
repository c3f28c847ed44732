//! User registration and API key handling.

use crate::{
    db::{self, DbPool},
    error::AppError,
    models::user::{RegisterUserRequest, User},
};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

/// Hash an API key for storage or lookup (SHA-256, hex encoded).
pub fn hash_api_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Generate cryptographically secure random API key.
///
/// 64 hex characters (32 random bytes)
fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Register a new user.
///
/// # Process
///
/// 1. Validate username, email and phone number
/// 2. Generate an API key and store only its hash
/// 3. Return the user with the plaintext key (only time it's shown)
///
/// # Errors
///
/// - `Validation`: Malformed fields
/// - `UserAlreadyExists`: Username or email taken
/// - `Database`: Database error occurred
pub async fn register_user(
    pool: &DbPool,
    request: RegisterUserRequest,
) -> Result<(User, String), AppError> {
    request.validate()?;

    let api_key = generate_api_key();

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, role, phone_number, api_key_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(&request.username)
    .bind(&request.email)
    .bind(request.role.as_str())
    .bind(&request.phone_number)
    .bind(hash_api_key(&api_key))
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if db::is_uniqueness_violation(&e) {
            AppError::UserAlreadyExists
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    Ok((user, api_key))
}

/// Look up an active user by API key.
pub async fn find_by_api_key(pool: &DbPool, api_key: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE api_key_hash = $1 AND is_active = true",
    )
    .bind(hash_api_key(api_key))
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Get user by ID.
pub async fn get_user_by_id(pool: &DbPool, user_id: Uuid) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}
