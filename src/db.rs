//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a PostgreSQL connection pool
//! - Running database migrations automatically
//! - Classifying constraint violations raised by PostgreSQL

use sqlx::{Pool, Postgres};

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// SQLSTATE raised when a UNIQUE constraint or unique index is violated.
const UNIQUE_VIOLATION: &str = "23505";

/// SQLSTATE raised when an EXCLUDE constraint is violated.
const EXCLUSION_VIOLATION: &str = "23P01";

/// SQLSTATE raised when a row is still referenced by a foreign key.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Create a new PostgreSQL connection pool.
///
/// A connection pool maintains multiple database connections that are reused
/// across HTTP requests instead of opening a new connection for each request.
///
/// # Arguments
///
/// * `database_url` - PostgreSQL connection string
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns an error if:
/// - Database connection string is invalid
/// - Cannot connect to PostgreSQL server
/// - Database authentication fails
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are tracked in the `_sqlx_migrations` table, so each migration runs only once.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro reads migrations at compile time from ./migrations directory
    sqlx::migrate!("./migrations").run(pool).await
}

fn sqlstate(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// True if the error is a UNIQUE or EXCLUDE constraint violation.
///
/// Used to turn a lost booking race into a business outcome instead of
/// an internal error.
pub fn is_uniqueness_violation(error: &sqlx::Error) -> bool {
    matches!(
        sqlstate(error).as_deref(),
        Some(UNIQUE_VIOLATION) | Some(EXCLUSION_VIOLATION)
    )
}

/// True if the error is a foreign key violation.
pub fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    sqlstate(error).as_deref() == Some(FOREIGN_KEY_VIOLATION)
}
