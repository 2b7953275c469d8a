//! Order Repository
//!
//! Status changes go through [`transition`]: the compare-and-set update and
//! the log insert commit together or not at all.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderCreate, OrderLog, OrderStatus};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT id, user_id, restaurant_id, cart_id, order_status, total_amount, customer_name, customer_contact, delivery_address, created_at, updated_at FROM orders";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("{ORDER_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// Log entries in insertion order
pub async fn find_logs(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderLog>> {
    let logs = sqlx::query_as::<_, OrderLog>(
        "SELECT id, order_id, status, note, timestamp FROM order_log WHERE order_id = ? ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(logs)
}

/// Insert a `pending` order with its first log entry
pub async fn create(pool: &SqlitePool, data: OrderCreate) -> RepoResult<Order> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO orders (id, user_id, restaurant_id, cart_id, order_status, total_amount, customer_name, customer_contact, delivery_address, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(data.user_id)
    .bind(data.restaurant_id)
    .bind(data.cart_id)
    .bind(OrderStatus::Pending)
    .bind(data.total_amount)
    .bind(&data.customer_name)
    .bind(&data.customer_contact)
    .bind(&data.delivery_address)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO order_log (order_id, status, note, timestamp) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(OrderStatus::Pending)
        .bind("Order placed")
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

/// Compare-and-set the order status and append one log entry
///
/// Returns `false` without writing anything when the stored status is no
/// longer `from` (another writer got there first).
pub async fn transition(
    pool: &SqlitePool,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
    note: &str,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE orders SET order_status = ?1, updated_at = ?2 WHERE id = ?3 AND order_status = ?4",
    )
    .bind(to)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("INSERT INTO order_log (order_id, status, note, timestamp) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(to)
        .bind(note)
        .bind(now)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}
