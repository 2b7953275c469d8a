//! Product Repository
//!
//! Read side only; the catalog is owned by the menu service.

use super::{RepoError, RepoResult};
use shared::models::Product;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, restaurant_id, name, is_available FROM product WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

pub async fn count_by_restaurant(pool: &SqlitePool, restaurant_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product WHERE restaurant_id = ?")
        .bind(restaurant_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// One page of a restaurant's products, ordered by id
pub async fn page_by_restaurant(
    pool: &SqlitePool,
    restaurant_id: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT id, restaurant_id, name, is_available FROM product WHERE restaurant_id = ? ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(restaurant_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

/// Insert a product row (catalog import / seeding)
pub async fn create(
    pool: &SqlitePool,
    restaurant_id: i64,
    name: &str,
    is_available: bool,
) -> RepoResult<Product> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO product (id, restaurant_id, name, is_available) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(restaurant_id)
        .bind(name)
        .bind(is_available)
        .execute(pool)
        .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn set_available(pool: &SqlitePool, id: i64, is_available: bool) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE product SET is_available = ? WHERE id = ?")
        .bind(is_available)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(())
}
