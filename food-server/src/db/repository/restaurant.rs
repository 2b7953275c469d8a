//! Restaurant Repository
//!
//! `is_open` / `last_status_update` are only written by [`set_open_status`],
//! shared by the scheduler, forced updates and the manual toggle.

use super::{RepoError, RepoResult};
use shared::models::{Restaurant, RestaurantCreate, RestaurantStatusChange, WeeklySchedule};
use sqlx::SqlitePool;

const RESTAURANT_SELECT: &str = "SELECT id, name, status, is_open, auto_open_close, opening_hours, timezone, contact_number, last_status_update, created_at, updated_at FROM restaurant";

const STATUS_CHANGE_SELECT: &str = "SELECT id, restaurant_id, previous_status, new_status, reason, updated_by, created_at FROM restaurant_status_change";

fn encode_hours(hours: &WeeklySchedule) -> RepoResult<String> {
    serde_json::to_string(hours)
        .map_err(|e| RepoError::Database(format!("Failed to encode opening hours: {e}")))
}

/// Restaurant row with `opening_hours` still as stored JSON text
#[derive(Debug, sqlx::FromRow)]
struct RestaurantRecord {
    id: i64,
    name: String,
    status: String,
    is_open: bool,
    auto_open_close: bool,
    opening_hours: String,
    timezone: String,
    contact_number: Option<String>,
    last_status_update: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl RestaurantRecord {
    fn decode(self) -> Result<Restaurant, UndecodableRestaurant> {
        let opening_hours = match serde_json::from_str::<WeeklySchedule>(&self.opening_hours) {
            Ok(hours) => hours,
            Err(e) => {
                return Err(UndecodableRestaurant {
                    id: self.id,
                    error: e.to_string(),
                });
            }
        };
        Ok(Restaurant {
            id: self.id,
            name: self.name,
            status: self.status,
            is_open: self.is_open,
            auto_open_close: self.auto_open_close,
            opening_hours,
            timezone: self.timezone,
            contact_number: self.contact_number,
            last_status_update: self.last_status_update,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Scanned row whose stored schedule is not a valid `WeeklySchedule`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndecodableRestaurant {
    pub id: i64,
    pub error: String,
}

impl From<UndecodableRestaurant> for RepoError {
    fn from(bad: UndecodableRestaurant) -> Self {
        RepoError::Database(format!(
            "Restaurant {} has unreadable opening hours: {}",
            bad.id, bad.error
        ))
    }
}

/// One row of a scheduler scan
pub type ScannedRestaurant = Result<Restaurant, UndecodableRestaurant>;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Restaurant>> {
    let record = sqlx::query_as::<_, RestaurantRecord>(&format!("{RESTAURANT_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(record.map(RestaurantRecord::decode).transpose()?)
}

pub async fn create(pool: &SqlitePool, data: RestaurantCreate) -> RepoResult<Restaurant> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let hours = encode_hours(&data.opening_hours)?;
    let timezone = data.timezone.unwrap_or_else(|| "Asia/Kolkata".to_string());

    sqlx::query(
        "INSERT INTO restaurant (id, name, status, is_open, auto_open_close, opening_hours, timezone, contact_number, created_at, updated_at) VALUES (?1, ?2, 'active', 0, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(data.auto_open_close)
    .bind(hours)
    .bind(timezone)
    .bind(data.contact_number)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create restaurant".into()))
}

const AUTO_MANAGED_FILTER: &str = "WHERE auto_open_close = 1 AND status = 'active'";

pub async fn count_auto_managed(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM restaurant {AUTO_MANAGED_FILTER}"))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// One page of restaurants the scheduler manages, ordered by id
///
/// Schedules are decoded per row: a corrupt row comes back as `Err` in its
/// slot instead of failing the page.
pub async fn page_auto_managed(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<ScannedRestaurant>> {
    let records = sqlx::query_as::<_, RestaurantRecord>(&format!(
        "{RESTAURANT_SELECT} {AUTO_MANAGED_FILTER} ORDER BY id LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(records.into_iter().map(RestaurantRecord::decode).collect())
}

pub async fn update_timing(
    pool: &SqlitePool,
    id: i64,
    hours: &WeeklySchedule,
    auto_open_close: bool,
) -> RepoResult<Restaurant> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE restaurant SET opening_hours = ?1, auto_open_close = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(encode_hours(hours)?)
    .bind(auto_open_close)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Restaurant {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Restaurant {id} not found")))
}

/// Flip `is_open` and record the change
///
/// Returns the audit row when the flag actually changed, `None` when it
/// already had the requested value. The conditional update and the audit
/// insert share one transaction, so concurrent writers never record the same
/// flip twice.
pub async fn set_open_status(
    pool: &SqlitePool,
    id: i64,
    is_open: bool,
    reason: &str,
    updated_by: &str,
) -> RepoResult<Option<RestaurantStatusChange>> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE restaurant SET is_open = ?1, last_status_update = ?2, updated_at = ?2 WHERE id = ?3 AND is_open != ?1",
    )
    .bind(is_open)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM restaurant WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        tx.rollback().await?;
        return match exists {
            Some(_) => Ok(None),
            None => Err(RepoError::NotFound(format!("Restaurant {id} not found"))),
        };
    }

    let change = RestaurantStatusChange {
        id: shared::util::snowflake_id(),
        restaurant_id: id,
        previous_status: !is_open,
        new_status: is_open,
        reason: reason.to_string(),
        updated_by: updated_by.to_string(),
        created_at: now,
    };
    sqlx::query(
        "INSERT INTO restaurant_status_change (id, restaurant_id, previous_status, new_status, reason, updated_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(change.id)
    .bind(change.restaurant_id)
    .bind(change.previous_status)
    .bind(change.new_status)
    .bind(&change.reason)
    .bind(&change.updated_by)
    .bind(change.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(change))
}

/// Status changes since `since_millis`, newest first
pub async fn status_history(
    pool: &SqlitePool,
    restaurant_id: i64,
    since_millis: i64,
) -> RepoResult<Vec<RestaurantStatusChange>> {
    let changes = sqlx::query_as::<_, RestaurantStatusChange>(&format!(
        "{STATUS_CHANGE_SELECT} WHERE restaurant_id = ? AND created_at >= ? ORDER BY created_at DESC, id DESC"
    ))
    .bind(restaurant_id)
    .bind(since_millis)
    .fetch_all(pool)
    .await?;
    Ok(changes)
}

/// Delete status changes older than `before_millis`
pub async fn prune_history(pool: &SqlitePool, before_millis: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM restaurant_status_change WHERE created_at < ?")
        .bind(before_millis)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
