//! Porter Delivery Model (配送记录)
//!
//! One row per carrier order. At most one row per food order is active;
//! reassignment deactivates the current row and appends a new one.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PorterDelivery {
    pub id: i64,
    pub order_id: i64,
    /// Carrier-side order id (unique)
    pub porter_order_id: String,
    /// Last carrier event or "created"
    pub status: String,
    pub partner_name: Option<String>,
    pub partner_phone_number: Option<String>,
    pub vehicle_number: Option<String>,
    pub tracking_url: Option<String>,
    pub estimated_delivery_time: Option<i64>,
    pub actual_delivery_time: Option<i64>,
    pub pickup_time: Option<i64>,
    pub delivery_fee: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields for a freshly dispatched carrier order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PorterDeliveryCreate {
    pub order_id: i64,
    pub porter_order_id: String,
    pub tracking_url: Option<String>,
    pub estimated_delivery_time: Option<i64>,
    pub delivery_fee: f64,
}
