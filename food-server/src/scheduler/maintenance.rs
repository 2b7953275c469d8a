//! 营业状态历史维护
//!
//! 每小时执行一次：清理 30 天前的状态变更记录，并巡检自动管理餐厅的营业时间配置。
//! 注册为 `TaskKind::Periodic`。

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::PAGE_SIZE;
use super::store::RestaurantStore;
use crate::utils::validation::validate_schedule;

pub const MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60 * 60);
pub const HISTORY_RETENTION_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub pruned: u64,
    pub invalid_schedules: usize,
}

pub struct StatusMaintenance {
    store: Arc<dyn RestaurantStore>,
}

impl StatusMaintenance {
    pub fn new(store: Arc<dyn RestaurantStore>) -> Self {
        Self { store }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!("Status history maintenance started");
        let mut ticker = tokio::time::interval(MAINTENANCE_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once(Utc::now()).await;
                }
                _ = shutdown.cancelled() => {
                    tracing::info!("Status history maintenance received shutdown signal");
                    return;
                }
            }
        }
    }

    pub async fn run_once(&self, now: DateTime<Utc>) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        let cutoff = now - chrono::Duration::days(HISTORY_RETENTION_DAYS);
        match self.store.prune_history(cutoff.timestamp_millis()).await {
            Ok(0) => {}
            Ok(n) => {
                tracing::info!("Pruned {} status change record(s) older than {} days", n, HISTORY_RETENTION_DAYS);
                report.pruned = n;
            }
            Err(e) => tracing::error!(error = %e, "Failed to prune status history"),
        }

        let mut offset = 0;
        loop {
            let page = match self.store.page_auto_managed(PAGE_SIZE, offset).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load restaurants for schedule check");
                    break;
                }
            };
            for scanned in &page {
                match scanned {
                    Ok(restaurant) => {
                        if let Err(e) = validate_schedule(&restaurant.opening_hours) {
                            tracing::warn!(restaurant_id = %restaurant.id, error = %e, "Auto-managed restaurant has malformed opening hours");
                            report.invalid_schedules += 1;
                        }
                    }
                    Err(bad) => {
                        tracing::warn!(restaurant_id = %bad.id, error = %bad.error, "Auto-managed restaurant has unreadable opening hours");
                        report.invalid_schedules += 1;
                    }
                }
            }
            if (page.len() as i64) < PAGE_SIZE {
                break;
            }
            offset += PAGE_SIZE;
        }

        report
    }
}
