//! User model and registration request/response types.
//!
//! Users are either restaurant owners or customers. They authenticate with
//! a bearer API key that is generated at registration and stored as a
//! SHA-256 hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// What a user is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Manages restaurants, their tables and opening hours
    Owner,
    /// Books reservations
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Customer => "customer",
        }
    }

    /// Parse the role column value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(Role::Owner),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

/// Represents a user record from the database.
///
/// # Database Table
///
/// Maps to the `users` table. `role` is kept as text (`owner` or
/// `customer`, enforced by a CHECK constraint); use [`Role::parse`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub phone_number: String,

    /// SHA-256 hash of the user's API key (64 hex characters)
    pub api_key_hash: String,

    /// Inactive users are rejected during authentication.
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

/// Request body for registering a new user.
///
/// # JSON Example
///
/// ```json
/// {
///   "username": "alice",
///   "email": "alice@example.com",
///   "role": "customer",
///   "phone_number": "+15550100"
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    pub username: String,

    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,

    pub role: Role,

    #[serde(default)]
    #[validate(length(max = 15))]
    pub phone_number: String,
}

/// Public view of a user. Never includes the API key hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            phone_number: user.phone_number,
            created_at: user.created_at,
        }
    }
}

/// Response returned once, at registration.
///
/// The plaintext `api_key` is not stored and cannot be retrieved again.
#[derive(Debug, Serialize)]
pub struct RegisteredUserResponse {
    pub user: UserResponse,
    pub api_key: String,
}
