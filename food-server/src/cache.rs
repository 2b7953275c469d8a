//! 餐厅营业时间缓存
//!
//! 进程内 TTL 缓存，值以 JSON 保存。
//!
//! | Key | TTL |
//! |-----|-----|
//! | `restaurant:{id}:timing` | 5 分钟 |
//! | `restaurant:{id}:time_status` | 1 分钟 |
//!
//! 任何营业状态或营业时间写入之后必须调用 [`TimingCache::invalidate_restaurant`]。

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

pub const TIMING_TTL: Duration = Duration::from_secs(5 * 60);
pub const TIME_STATUS_TTL: Duration = Duration::from_secs(60);

pub fn timing_key(restaurant_id: i64) -> String {
    format!("restaurant:{restaurant_id}:timing")
}

pub fn time_status_key(restaurant_id: i64) -> String {
    format!("restaurant:{restaurant_id}:time_status")
}

#[derive(Debug, Default)]
pub struct TimingCache {
    entries: DashMap<String, (Instant, serde_json::Value)>,
}

impl TimingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh value for `key`; expired or undecodable entries are dropped
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = {
            let entry = self.entries.get(key)?;
            let (expires_at, value) = entry.value();
            if Instant::now() < *expires_at {
                Some(value.clone())
            } else {
                None
            }
        };

        match value.and_then(|v| serde_json::from_value(v).ok()) {
            Some(v) => Some(v),
            None => {
                self.entries.remove(key);
                None
            }
        }
    }

    pub fn set<T: Serialize>(&self, key: impl Into<String>, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(json) => {
                self.entries.insert(key.into(), (Instant::now() + ttl, json));
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode cache value"),
        }
    }

    /// Drop every entry for the restaurant
    pub fn invalidate_restaurant(&self, restaurant_id: i64) {
        let prefix = format!("restaurant:{restaurant_id}:");
        self.entries.retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
