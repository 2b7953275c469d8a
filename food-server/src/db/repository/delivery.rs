//! Porter Delivery Repository
//!
//! Rows are never deleted. Reassignment deactivates the current row and a
//! new active row is inserted; the partial unique index keeps at most one
//! active row per order.

use super::{RepoError, RepoResult};
use shared::models::{PorterDelivery, PorterDeliveryCreate};
use sqlx::SqlitePool;

const DELIVERY_SELECT: &str = "SELECT id, order_id, porter_order_id, status, partner_name, partner_phone_number, vehicle_number, tracking_url, estimated_delivery_time, actual_delivery_time, pickup_time, delivery_fee, is_active, created_at, updated_at FROM porter_delivery";

/// Field changes carried by one carrier event
///
/// `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryEventUpdate {
    pub status: String,
    pub partner_name: Option<String>,
    pub partner_phone_number: Option<String>,
    pub vehicle_number: Option<String>,
    pub estimated_delivery_time: Option<i64>,
    pub pickup_time: Option<i64>,
    pub actual_delivery_time: Option<i64>,
    /// Reopened trip: forget the recorded delivery time
    pub clear_actual_delivery_time: bool,
    pub deactivate: bool,
}

pub async fn find_by_porter_order_id(
    pool: &SqlitePool,
    porter_order_id: &str,
) -> RepoResult<Option<PorterDelivery>> {
    let delivery = sqlx::query_as::<_, PorterDelivery>(&format!(
        "{DELIVERY_SELECT} WHERE porter_order_id = ?"
    ))
    .bind(porter_order_id)
    .fetch_optional(pool)
    .await?;
    Ok(delivery)
}

pub async fn find_active_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<PorterDelivery>> {
    let deliveries = sqlx::query_as::<_, PorterDelivery>(&format!(
        "{DELIVERY_SELECT} WHERE order_id = ? AND is_active = 1"
    ))
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(deliveries)
}

/// Full history for an order, oldest first
pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<PorterDelivery>> {
    let deliveries = sqlx::query_as::<_, PorterDelivery>(&format!(
        "{DELIVERY_SELECT} WHERE order_id = ? ORDER BY created_at, id"
    ))
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(deliveries)
}

pub async fn deactivate_all_for_order(pool: &SqlitePool, order_id: i64) -> RepoResult<u64> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE porter_delivery SET is_active = 0, updated_at = ? WHERE order_id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(order_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}

/// Insert an active delivery with status `created`
pub async fn create(pool: &SqlitePool, data: PorterDeliveryCreate) -> RepoResult<PorterDelivery> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO porter_delivery (id, order_id, porter_order_id, status, tracking_url, estimated_delivery_time, delivery_fee, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, 'created', ?4, ?5, ?6, 1, ?7, ?7)",
    )
    .bind(id)
    .bind(data.order_id)
    .bind(&data.porter_order_id)
    .bind(&data.tracking_url)
    .bind(data.estimated_delivery_time)
    .bind(data.delivery_fee)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create delivery".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PorterDelivery>> {
    let delivery = sqlx::query_as::<_, PorterDelivery>(&format!("{DELIVERY_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(delivery)
}

/// Apply a carrier event to the delivery row
pub async fn apply_event(
    pool: &SqlitePool,
    porter_order_id: &str,
    update: &DeliveryEventUpdate,
) -> RepoResult<PorterDelivery> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE porter_delivery SET status = ?1, partner_name = COALESCE(?2, partner_name), partner_phone_number = COALESCE(?3, partner_phone_number), vehicle_number = COALESCE(?4, vehicle_number), estimated_delivery_time = COALESCE(?5, estimated_delivery_time), pickup_time = COALESCE(?6, pickup_time), actual_delivery_time = CASE WHEN ?7 THEN NULL ELSE COALESCE(?8, actual_delivery_time) END, is_active = CASE WHEN ?9 THEN 0 ELSE is_active END, updated_at = ?10 WHERE porter_order_id = ?11",
    )
    .bind(&update.status)
    .bind(&update.partner_name)
    .bind(&update.partner_phone_number)
    .bind(&update.vehicle_number)
    .bind(update.estimated_delivery_time)
    .bind(update.pickup_time)
    .bind(update.clear_actual_delivery_time)
    .bind(update.actual_delivery_time)
    .bind(update.deactivate)
    .bind(now)
    .bind(porter_order_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Delivery {porter_order_id} not found")));
    }
    find_by_porter_order_id(pool, porter_order_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Delivery {porter_order_id} not found")))
}
