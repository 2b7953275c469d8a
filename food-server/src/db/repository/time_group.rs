//! Time Range Group Repository

use super::{RepoError, RepoResult};
use shared::models::{TimeRangeGroup, TimeRangeGroupCreate, TimeRangeGroupUpdate};
use sqlx::SqlitePool;

const GROUP_SELECT: &str = "SELECT g.id, g.restaurant_id, g.group_name, g.start_time, g.end_time, g.is_active, g.created_at, g.updated_at FROM time_range_group g";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<TimeRangeGroup>> {
    let group = sqlx::query_as::<_, TimeRangeGroup>(&format!("{GROUP_SELECT} WHERE g.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(group)
}

pub async fn find_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<TimeRangeGroup>> {
    let groups = sqlx::query_as::<_, TimeRangeGroup>(&format!(
        "{GROUP_SELECT} WHERE g.restaurant_id = ? ORDER BY g.start_time, g.id"
    ))
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(groups)
}

/// Groups a product belongs to, in creation order
pub async fn find_by_product(pool: &SqlitePool, product_id: i64) -> RepoResult<Vec<TimeRangeGroup>> {
    let groups = sqlx::query_as::<_, TimeRangeGroup>(&format!(
        "{GROUP_SELECT} JOIN time_range_group_item i ON i.group_id = g.id WHERE i.product_id = ? ORDER BY g.created_at, g.id"
    ))
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(groups)
}

/// `(product_id, group_id)` pairs for every grouped product of a restaurant
///
/// Ordered per product the same way as [`find_by_product`].
pub async fn memberships_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
) -> RepoResult<Vec<(i64, i64)>> {
    let pairs = sqlx::query_as::<_, (i64, i64)>(
        "SELECT i.product_id, g.id FROM time_range_group_item i JOIN time_range_group g ON g.id = i.group_id WHERE g.restaurant_id = ? ORDER BY i.product_id, g.created_at, g.id",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await?;
    Ok(pairs)
}

pub async fn create(
    pool: &SqlitePool,
    restaurant_id: i64,
    data: TimeRangeGroupCreate,
) -> RepoResult<TimeRangeGroup> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO time_range_group (id, restaurant_id, group_name, start_time, end_time, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(restaurant_id)
    .bind(&data.group_name)
    .bind(&data.start_time)
    .bind(&data.end_time)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create time group".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: TimeRangeGroupUpdate,
) -> RepoResult<TimeRangeGroup> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE time_range_group SET group_name = COALESCE(?1, group_name), start_time = COALESCE(?2, start_time), end_time = COALESCE(?3, end_time), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.group_name)
    .bind(data.start_time)
    .bind(data.end_time)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Time group {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Time group {id} not found")))
}

/// Delete a group; its product links cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM time_range_group WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Time group {id} not found")));
    }
    Ok(())
}

pub async fn add_product(pool: &SqlitePool, group_id: i64, product_id: i64) -> RepoResult<()> {
    sqlx::query("INSERT INTO time_range_group_item (group_id, product_id) VALUES (?, ?)")
        .bind(group_id)
        .bind(product_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn remove_product(pool: &SqlitePool, group_id: i64, product_id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM time_range_group_item WHERE group_id = ? AND product_id = ?")
        .bind(group_id)
        .bind(product_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Product {product_id} is not in time group {group_id}"
        )));
    }
    Ok(())
}
