//! Time Range Products Group (时段商品分组)
//!
//! A named recurring window such as "Breakfast" 07:00-11:00. Products in at
//! least one group are only sold while one of their active groups is open.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TimeRangeGroup {
    pub id: i64,
    pub restaurant_id: i64,
    pub group_name: String,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM", may be earlier than `start_time` for overnight windows
    pub end_time: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create group payload (restaurant id comes from the path)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRangeGroupCreate {
    pub group_name: String,
    pub start_time: String,
    pub end_time: String,
}

/// Partial update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeRangeGroupUpdate {
    pub group_name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_active: Option<bool>,
}

/// Add product to group payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRangeGroupProductAdd {
    pub product_id: i64,
}
