//! Restaurant Model (餐厅营业状态)

use super::schedule::WeeklySchedule;
use serde::{Deserialize, Serialize};

/// Restaurant row
///
/// `is_open` is the effective status. When `auto_open_close` is set the
/// scheduler keeps it in line with `opening_hours`, otherwise it is manual.
/// The repository decodes `opening_hours` from its JSON column row by row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    /// active | inactive | suspended
    pub status: String,
    pub is_open: bool,
    pub auto_open_close: bool,
    pub opening_hours: WeeklySchedule,
    /// IANA timezone name
    pub timezone: String,
    pub contact_number: Option<String>,
    /// Last `is_open` flip (Unix millis)
    pub last_status_update: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create restaurant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCreate {
    pub name: String,
    #[serde(default)]
    pub opening_hours: WeeklySchedule,
    #[serde(default = "default_true")]
    pub auto_open_close: bool,
    pub timezone: Option<String>,
    pub contact_number: Option<String>,
}

/// Update shop timing payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantTimingUpdate {
    pub opening_hours: WeeklySchedule,
    pub auto_open_close: bool,
}

/// Manual open/close payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantStatusUpdate {
    pub is_open: bool,
}

/// Restaurant timing view (cached under `restaurant:{id}:timing`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantTiming {
    pub restaurant_id: i64,
    pub opening_hours: WeeklySchedule,
    pub auto_open_close: bool,
    pub is_open: bool,
    pub timezone: String,
}

impl From<&Restaurant> for RestaurantTiming {
    fn from(r: &Restaurant) -> Self {
        Self {
            restaurant_id: r.id,
            opening_hours: r.opening_hours.clone(),
            auto_open_close: r.auto_open_close,
            is_open: r.is_open,
            timezone: r.timezone.clone(),
        }
    }
}

/// Result of evaluating one restaurant's status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantStatusView {
    pub restaurant_id: i64,
    pub is_open: bool,
    pub auto_open_close: bool,
    /// Whether this evaluation flipped `is_open`
    pub changed: bool,
    pub last_status_update: Option<i64>,
}

/// Time-aware status of a restaurant (cached under `restaurant:{id}:time_status`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantTimeStatus {
    pub is_open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_time: Option<String>,
    /// RFC 3339 in the restaurant timezone, only when currently closed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_open_time: Option<String>,
    pub auto_open_close_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status_update: Option<i64>,
    pub timezone: String,
}

/// Audit record of an `is_open` flip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RestaurantStatusChange {
    pub id: i64,
    pub restaurant_id: i64,
    pub previous_status: bool,
    pub new_status: bool,
    pub reason: String,
    /// "system" for scheduler and forced flips, "manual" for operator toggles
    pub updated_by: String,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}
