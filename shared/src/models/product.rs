//! Product Model
//!
//! Only the fields the availability check reads. Catalog management lives elsewhere.

use super::restaurant::RestaurantTimeStatus;
use super::time_group::TimeRangeGroup;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    /// Manual sold-out switch
    pub is_available: bool,
}

/// Availability of a product at a given instant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAvailability {
    pub product_id: i64,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Start time ("HH:MM") of a group that will make the product available again
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_available: Option<String>,
    pub time_groups: Vec<TimeRangeGroup>,
    /// Instant the check was evaluated for, rendered in the restaurant's timezone
    pub evaluated_at: String,
}

/// One product of a restaurant-wide listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductTimeInfo {
    pub product: Product,
    pub time_groups: Vec<TimeRangeGroup>,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_available: Option<String>,
}

/// Every product of a restaurant evaluated at one instant (paged)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductsByTime {
    pub products: Vec<ProductTimeInfo>,
    pub total_count: i64,
    pub page: u32,
    pub page_size: u32,
    /// Local "HH:MM" the products were evaluated at
    pub requested_time: String,
    pub evaluated_at: String,
    /// All of the restaurant's groups, active or not
    pub time_groups: Vec<TimeRangeGroup>,
    pub restaurant_status: RestaurantTimeStatus,
}
