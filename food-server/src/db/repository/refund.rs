//! Refund Repository

use super::{RepoError, RepoResult};
use shared::models::{Refund, RefundStatus};
use sqlx::SqlitePool;

const REFUND_SELECT: &str = "SELECT id, order_id, amount, reason, status, processed_at, created_at, updated_at FROM refund";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Refund>> {
    let refund = sqlx::query_as::<_, Refund>(&format!("{REFUND_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(refund)
}

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Option<Refund>> {
    let refund = sqlx::query_as::<_, Refund>(&format!("{REFUND_SELECT} WHERE order_id = ?"))
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    Ok(refund)
}

/// Newest first, optionally filtered by status
pub async fn find_all(
    pool: &SqlitePool,
    status: Option<RefundStatus>,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Refund>> {
    let refunds = sqlx::query_as::<_, Refund>(&format!(
        "{REFUND_SELECT} WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3"
    ))
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(refunds)
}

/// Insert a `pending` refund; the unique `order_id` column rejects a second one
pub async fn create(pool: &SqlitePool, order_id: i64, amount: f64, reason: &str) -> RepoResult<Refund> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO refund (id, order_id, amount, reason, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(order_id)
    .bind(amount)
    .bind(reason)
    .bind(RefundStatus::Pending)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create refund".into()))
}

/// Compare-and-set the refund status; `processed` also stamps `processed_at`
pub async fn transition(
    pool: &SqlitePool,
    id: i64,
    from: RefundStatus,
    to: RefundStatus,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let processed_at = (to == RefundStatus::Processed).then_some(now);
    let rows = sqlx::query(
        "UPDATE refund SET status = ?1, processed_at = COALESCE(?2, processed_at), updated_at = ?3 WHERE id = ?4 AND status = ?5",
    )
    .bind(to)
    .bind(processed_at)
    .bind(now)
    .bind(id)
    .bind(from)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
