//! Restaurant catalog service.
//!
//! Owners manage restaurants, tables and opening hours here. Every write
//! is scoped to the owner: a restaurant managed by someone else behaves
//! exactly like a missing one.

use std::collections::HashMap;

use sqlx::PgConnection;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{self, DbPool},
    error::AppError,
    models::restaurant::{
        CreateRestaurantRequest, OpeningHour, OpeningHourInput, Restaurant, RestaurantResponse,
        Table, TableInput, UpdateRestaurantRequest, UpdateTableRequest,
    },
};

const TABLE_COLUMNS: &str = "id, restaurant_id, table_number, capacity, is_outdoor, is_available";

/// Attach opening hours and tables to a batch of restaurants.
///
/// Two queries regardless of how many restaurants are passed.
async fn with_catalog(
    conn: &mut PgConnection,
    restaurants: Vec<Restaurant>,
) -> Result<Vec<RestaurantResponse>, AppError> {
    let ids: Vec<Uuid> = restaurants.iter().map(|r| r.id).collect();

    let hours = sqlx::query_as::<_, OpeningHour>(
        r#"
        SELECT * FROM opening_hours
        WHERE restaurant_id = ANY($1)
        ORDER BY restaurant_id,
                 array_position(ARRAY['mon','tue','wed','thu','fri','sat','sun']::varchar[], day),
                 open_time
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let tables = sqlx::query_as::<_, Table>(&format!(
        "SELECT {TABLE_COLUMNS} FROM restaurant_tables \
         WHERE restaurant_id = ANY($1) ORDER BY capacity, table_number"
    ))
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut hours_by_restaurant: HashMap<Uuid, Vec<OpeningHour>> = HashMap::new();
    for hour in hours {
        hours_by_restaurant
            .entry(hour.restaurant_id)
            .or_default()
            .push(hour);
    }
    let mut tables_by_restaurant: HashMap<Uuid, Vec<Table>> = HashMap::new();
    for table in tables {
        tables_by_restaurant
            .entry(table.restaurant_id)
            .or_default()
            .push(table);
    }

    Ok(restaurants
        .into_iter()
        .map(|restaurant| {
            let hours = hours_by_restaurant.remove(&restaurant.id).unwrap_or_default();
            let tables = tables_by_restaurant.remove(&restaurant.id).unwrap_or_default();
            RestaurantResponse::new(restaurant, hours, tables)
        })
        .collect())
}

async fn single_with_catalog(
    conn: &mut PgConnection,
    restaurant: Restaurant,
) -> Result<RestaurantResponse, AppError> {
    with_catalog(conn, vec![restaurant])
        .await?
        .pop()
        .ok_or(AppError::RestaurantNotFound)
}

/// Lock a restaurant managed by `owner_id`.
async fn find_owned_for_update(
    conn: &mut PgConnection,
    owner_id: Uuid,
    restaurant_id: Uuid,
) -> Result<Restaurant, AppError> {
    sqlx::query_as::<_, Restaurant>(
        "SELECT * FROM restaurants WHERE id = $1 AND owner_id = $2 FOR UPDATE",
    )
    .bind(restaurant_id)
    .bind(owner_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(AppError::RestaurantNotFound)
}

async fn insert_opening_hours(
    conn: &mut PgConnection,
    restaurant_id: Uuid,
    hours: &[OpeningHourInput],
) -> Result<(), AppError> {
    for hour in hours {
        sqlx::query(
            r#"
            INSERT INTO opening_hours (restaurant_id, day, open_time, close_time, is_closed)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(restaurant_id)
        .bind(hour.day.as_str())
        .bind(hour.open_time)
        .bind(hour.close_time)
        .bind(hour.is_closed)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn insert_table(
    conn: &mut PgConnection,
    restaurant_id: Uuid,
    table: &TableInput,
) -> Result<Table, AppError> {
    let table = sqlx::query_as::<_, Table>(&format!(
        r#"
        INSERT INTO restaurant_tables
            (restaurant_id, table_number, capacity, is_outdoor, is_available)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {TABLE_COLUMNS}
        "#
    ))
    .bind(restaurant_id)
    .bind(&table.table_number)
    .bind(table.capacity)
    .bind(table.is_outdoor)
    .bind(table.is_available)
    .fetch_one(&mut *conn)
    .await?;

    Ok(table)
}

/// List every restaurant with its tables and opening hours, newest first.
pub async fn list_restaurants(pool: &DbPool) -> Result<Vec<RestaurantResponse>, AppError> {
    let mut conn = pool.acquire().await?;

    let restaurants =
        sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants ORDER BY created_at DESC")
            .fetch_all(&mut *conn)
            .await?;

    with_catalog(&mut conn, restaurants).await
}

/// Get a restaurant with its tables and opening hours.
pub async fn get_restaurant(
    pool: &DbPool,
    restaurant_id: Uuid,
) -> Result<RestaurantResponse, AppError> {
    let mut conn = pool.acquire().await?;

    let restaurant = sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1")
        .bind(restaurant_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(AppError::RestaurantNotFound)?;

    single_with_catalog(&mut conn, restaurant).await
}

/// Create a restaurant with its opening hours and tables.
///
/// Everything is inserted in one transaction.
pub async fn create_restaurant(
    pool: &DbPool,
    owner_id: Uuid,
    request: CreateRestaurantRequest,
) -> Result<RestaurantResponse, AppError> {
    request.validate()?;

    let mut tx = pool.begin().await?;

    let restaurant = sqlx::query_as::<_, Restaurant>(
        r#"
        INSERT INTO restaurants (owner_id, name, address, phone_number)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(owner_id)
    .bind(&request.name)
    .bind(&request.address)
    .bind(&request.phone_number)
    .fetch_one(&mut *tx)
    .await?;

    insert_opening_hours(&mut tx, restaurant.id, &request.opening_hours).await?;
    for table in &request.tables {
        insert_table(&mut tx, restaurant.id, table).await?;
    }

    let response = single_with_catalog(&mut tx, restaurant).await?;
    tx.commit().await?;

    tracing::info!(restaurant_id = %response.id, %owner_id, "Restaurant created");
    Ok(response)
}

/// Update a restaurant's details, optionally replacing its opening hours.
pub async fn update_restaurant(
    pool: &DbPool,
    owner_id: Uuid,
    restaurant_id: Uuid,
    request: UpdateRestaurantRequest,
) -> Result<RestaurantResponse, AppError> {
    request.validate()?;

    let mut tx = pool.begin().await?;
    find_owned_for_update(&mut tx, owner_id, restaurant_id).await?;

    let restaurant = sqlx::query_as::<_, Restaurant>(
        r#"
        UPDATE restaurants
        SET name = $2, address = $3, phone_number = $4
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(restaurant_id)
    .bind(&request.name)
    .bind(&request.address)
    .bind(&request.phone_number)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(hours) = &request.opening_hours {
        sqlx::query("DELETE FROM opening_hours WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .execute(&mut *tx)
            .await?;
        insert_opening_hours(&mut tx, restaurant_id, hours).await?;
    }

    let response = single_with_catalog(&mut tx, restaurant).await?;
    tx.commit().await?;

    tracing::info!(%restaurant_id, "Restaurant updated");
    Ok(response)
}

/// Delete a restaurant that has never been booked.
///
/// # Errors
///
/// - `RestaurantNotFound`: Missing or managed by someone else
/// - `RestaurantInUse`: Reservations reference it
pub async fn delete_restaurant(
    pool: &DbPool,
    owner_id: Uuid,
    restaurant_id: Uuid,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM restaurants WHERE id = $1 AND owner_id = $2")
        .bind(restaurant_id)
        .bind(owner_id)
        .execute(pool)
        .await
        .map_err(|e| {
            if db::is_foreign_key_violation(&e) {
                AppError::RestaurantInUse
            } else {
                AppError::Database(e)
            }
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::RestaurantNotFound);
    }

    tracing::info!(%restaurant_id, "Restaurant deleted");
    Ok(())
}

/// Add a table to one of the owner's restaurants.
pub async fn add_table(
    pool: &DbPool,
    owner_id: Uuid,
    restaurant_id: Uuid,
    request: TableInput,
) -> Result<Table, AppError> {
    request.validate()?;

    let mut tx = pool.begin().await?;
    find_owned_for_update(&mut tx, owner_id, restaurant_id).await?;
    let table = insert_table(&mut tx, restaurant_id, &request).await?;
    tx.commit().await?;

    Ok(table)
}

/// Edit a table's number and flags.
pub async fn update_table(
    pool: &DbPool,
    owner_id: Uuid,
    restaurant_id: Uuid,
    table_id: Uuid,
    request: UpdateTableRequest,
) -> Result<Table, AppError> {
    request.validate()?;

    let table = sqlx::query_as::<_, Table>(
        r#"
        UPDATE restaurant_tables t
        SET table_number = COALESCE($4, t.table_number),
            is_outdoor = COALESCE($5, t.is_outdoor),
            is_available = COALESCE($6, t.is_available)
        FROM restaurants r
        WHERE t.id = $1 AND t.restaurant_id = $2
          AND r.id = t.restaurant_id AND r.owner_id = $3
        RETURNING t.id, t.restaurant_id, t.table_number, t.capacity, t.is_outdoor, t.is_available
        "#,
    )
    .bind(table_id)
    .bind(restaurant_id)
    .bind(owner_id)
    .bind(&request.table_number)
    .bind(request.is_outdoor)
    .bind(request.is_available)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::TableNotFound)?;

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_table(pool: &DbPool) -> (Uuid, Uuid, Uuid) {
        let tag = Uuid::new_v4().simple().to_string();
        let owner_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (username, email, role, api_key_hash) \
             VALUES ($1, $2, 'owner', $3) RETURNING id",
        )
        .bind(format!("owner-{tag}"))
        .bind(format!("{tag}@example.com"))
        .bind(&tag)
        .fetch_one(pool)
        .await
        .unwrap();

        let restaurant_id: Uuid = sqlx::query_scalar(
            "INSERT INTO restaurants (owner_id, name, address) \
             VALUES ($1, 'Bistro', 'Main St 1') RETURNING id",
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await
        .unwrap();

        let table_id: Uuid = sqlx::query_scalar(
            "INSERT INTO restaurant_tables (restaurant_id, table_number, capacity) \
             VALUES ($1, 'T1', 4) RETURNING id",
        )
        .bind(restaurant_id)
        .fetch_one(pool)
        .await
        .unwrap();

        (owner_id, restaurant_id, table_id)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn update_table_returns_every_column(pool: DbPool) {
        let (owner_id, restaurant_id, table_id) = seed_table(&pool).await;

        let table = update_table(
            &pool,
            owner_id,
            restaurant_id,
            table_id,
            UpdateTableRequest {
                table_number: Some("Patio 1".into()),
                is_outdoor: Some(true),
                is_available: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(
            table,
            Table {
                id: table_id,
                restaurant_id,
                table_number: "Patio 1".into(),
                capacity: 4,
                is_outdoor: true,
                is_available: true,
            }
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn update_table_of_someone_elses_restaurant_is_not_found(pool: DbPool) {
        let (_owner_id, restaurant_id, table_id) = seed_table(&pool).await;

        let result = update_table(
            &pool,
            Uuid::new_v4(),
            restaurant_id,
            table_id,
            UpdateTableRequest {
                table_number: None,
                is_outdoor: Some(true),
                is_available: None,
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::TableNotFound)));
    }
}
