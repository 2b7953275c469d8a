//! 餐厅自动营业状态调度器
//!
//! 每 60 秒扫描一次开启了 `auto_open_close` 的餐厅，按营业时间计算应有状态，
//! 与当前 `is_open` 不一致时写库并清除缓存。
//!
//! 调度器由 [`ServerState`](crate::core::ServerState) 持有，可在运行时通过
//! `/api/system/automatic-status/*` 启停。单个餐厅失败只记日志，不影响本轮其余餐厅。

pub mod maintenance;
pub mod store;

pub use maintenance::StatusMaintenance;
pub use store::{RestaurantStore, SqliteRestaurantStore};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;
use serde::Serialize;
use shared::models::{Restaurant, RestaurantStatusChange, RestaurantStatusView};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::availability::{is_open_at, restaurant_tz};
use crate::cache::TimingCache;
use crate::core::{EngineError, EngineResult, Entity};

/// Fixed scan period
pub const TICK_INTERVAL: Duration = Duration::from_secs(60);
/// Restaurants loaded per query
pub const PAGE_SIZE: i64 = 100;

pub const AUTO_REASON: &str = "Automatic status update based on opening hours";
pub const FORCED_REASON: &str = "Forced status update";
pub const SYSTEM_ACTOR: &str = "system";

const DEFAULT_HISTORY_DAYS: i64 = 7;
/// Older rows are pruned by [`StatusMaintenance`]
const MAX_HISTORY_DAYS: i64 = maintenance::HISTORY_RETENTION_DAYS;
const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Outcome of one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub checked: usize,
    pub updated: usize,
    pub errors: usize,
}

pub struct StatusScheduler {
    store: Arc<dyn RestaurantStore>,
    cache: Arc<TimingCache>,
    default_tz: Tz,
    /// Token of the running ticker; `None` when stopped
    running: Mutex<Option<CancellationToken>>,
}

impl StatusScheduler {
    pub fn new(store: Arc<dyn RestaurantStore>, cache: Arc<TimingCache>, default_tz: Tz) -> Self {
        Self {
            store,
            cache,
            default_tz,
            running: Mutex::new(None),
        }
    }

    /// Spawn the ticker task
    ///
    /// Fails with [`EngineError::AlreadyRunning`] if a ticker is live; nothing
    /// is spawned in that case.
    pub fn start(self: &Arc<Self>) -> EngineResult<()> {
        let mut slot = self.running.lock();
        if slot.is_some() {
            return Err(EngineError::AlreadyRunning);
        }

        let token = CancellationToken::new();
        *slot = Some(token.clone());
        drop(slot);

        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(token).await });
        tracing::info!("Automatic restaurant status management started");
        Ok(())
    }

    /// Cancel the ticker; no-op when stopped
    pub fn stop(&self) {
        if let Some(token) = self.running.lock().take() {
            token.cancel();
            tracing::info!("Automatic restaurant status management stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(TICK_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    tracing::debug!("Status scheduler received shutdown signal");
                    return;
                }
                _ = ticker.tick() => {
                    self.run_tick(Utc::now()).await;
                }
            }
        }
    }

    /// Evaluate every auto-managed restaurant once
    ///
    /// The row count is taken up front so a page that fails to load is
    /// skipped instead of ending the scan. Restaurants added mid-scan are
    /// picked up on the next tick.
    pub async fn run_tick(&self, now: DateTime<Utc>) -> TickReport {
        let mut report = TickReport::default();

        let total = match self.store.count_auto_managed().await {
            Ok(total) => total,
            Err(e) => {
                tracing::error!(error = %e, "Failed to count restaurants for status check");
                report.errors += 1;
                return log_summary(report);
            }
        };

        let mut offset = 0;
        while offset < total {
            let page = match self.store.page_auto_managed(PAGE_SIZE, offset).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(offset, error = %e, "Failed to load restaurants for status check");
                    report.errors += 1;
                    offset += PAGE_SIZE;
                    continue;
                }
            };
            if page.is_empty() {
                break;
            }

            for scanned in &page {
                report.checked += 1;
                let restaurant = match scanned {
                    Ok(restaurant) => restaurant,
                    Err(bad) => {
                        tracing::error!(restaurant_id = %bad.id, error = %bad.error, "Skipping restaurant with unreadable opening hours");
                        report.errors += 1;
                        continue;
                    }
                };
                match self.apply(restaurant, now, AUTO_REASON).await {
                    Ok(Some(_)) => report.updated += 1,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!(restaurant_id = %restaurant.id, error = %e, "Failed to update restaurant status");
                        report.errors += 1;
                    }
                }
            }
            offset += PAGE_SIZE;
        }

        log_summary(report)
    }

    /// Evaluate one restaurant now, whether or not it is auto-managed
    pub async fn force_status_update(
        &self,
        restaurant_id: i64,
        now: DateTime<Utc>,
    ) -> EngineResult<RestaurantStatusView> {
        let restaurant = self
            .store
            .find_by_id(restaurant_id)
            .await?
            .ok_or_else(|| EngineError::not_found(Entity::Restaurant, restaurant_id))?;

        let change = self.apply(&restaurant, now, FORCED_REASON).await?;
        tracing::info!(restaurant_id = %restaurant_id, changed = change.is_some(), "Forced status update");

        Ok(RestaurantStatusView {
            restaurant_id,
            is_open: change.as_ref().map_or(restaurant.is_open, |c| c.new_status),
            auto_open_close: restaurant.auto_open_close,
            changed: change.is_some(),
            last_status_update: change
                .as_ref()
                .map(|c| c.created_at)
                .or(restaurant.last_status_update),
        })
    }

    /// Status changes for the last `days` days (default 7, clamped to 1..=30)
    pub async fn status_history(
        &self,
        restaurant_id: i64,
        days: Option<i64>,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<RestaurantStatusChange>> {
        if self.store.find_by_id(restaurant_id).await?.is_none() {
            return Err(EngineError::not_found(Entity::Restaurant, restaurant_id));
        }
        let days = days.unwrap_or(DEFAULT_HISTORY_DAYS).clamp(1, MAX_HISTORY_DAYS);
        let since = now.timestamp_millis() - days * DAY_MILLIS;
        Ok(self.store.status_history(restaurant_id, since).await?)
    }

    /// Persist the schedule's verdict if it differs from the stored flag
    async fn apply(
        &self,
        restaurant: &Restaurant,
        now: DateTime<Utc>,
        reason: &str,
    ) -> EngineResult<Option<RestaurantStatusChange>> {
        let tz = restaurant_tz(restaurant, self.default_tz);
        let should_be_open = is_open_at(&restaurant.opening_hours, tz, now, restaurant.is_open);

        let change = if should_be_open != restaurant.is_open {
            let change = self
                .store
                .set_open_status(restaurant.id, should_be_open, reason, SYSTEM_ACTOR)
                .await?;
            if change.is_some() {
                tracing::info!(
                    restaurant_id = %restaurant.id,
                    is_open = should_be_open,
                    "Restaurant {}",
                    if should_be_open { "opened" } else { "closed" }
                );
            }
            change
        } else {
            None
        };

        self.cache.invalidate_restaurant(restaurant.id);
        Ok(change)
    }
}

fn log_summary(report: TickReport) -> TickReport {
    tracing::info!(
        checked = report.checked,
        "Restaurant status check complete: {} updated, {} errors",
        report.updated,
        report.errors
    );
    report
}
