//! Order Model (订单生命周期)
//!
//! Order status is a closed set with a fixed transition table:
//!
//! ```text
//! pending    -> confirmed | cancelled
//! confirmed  -> preparing | cancelled
//! preparing  -> dispatched | cancelled
//! dispatched -> delivered | cancelled
//! delivered  -> (terminal)
//! cancelled  -> (terminal)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Dispatched,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Dispatched,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Statuses reachable from `self` in one step
    pub const fn allowed_transitions(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Confirmed, OrderStatus::Cancelled],
            OrderStatus::Confirmed => &[OrderStatus::Preparing, OrderStatus::Cancelled],
            OrderStatus::Preparing => &[OrderStatus::Dispatched, OrderStatus::Cancelled],
            OrderStatus::Dispatched => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Customer-facing message for a status change
    pub const fn status_message(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Your order has been placed",
            OrderStatus::Confirmed => "Your order has been confirmed by the restaurant",
            OrderStatus::Preparing => "Your order is being prepared",
            OrderStatus::Dispatched => "Your order is on the way",
            OrderStatus::Delivered => "Your order has been delivered",
            OrderStatus::Cancelled => "Your order has been cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {}", s))
    }
}

/// Order row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub cart_id: i64,
    pub order_status: OrderStatus,
    pub total_amount: f64,
    pub customer_name: String,
    pub customer_contact: String,
    pub delivery_address: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Append-only order log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLog {
    pub id: i64,
    pub order_id: i64,
    pub status: OrderStatus,
    pub note: String,
    /// Unix millis, UTC
    pub timestamp: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub user_id: i64,
    pub restaurant_id: i64,
    pub cart_id: i64,
    pub total_amount: f64,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_contact: String,
    #[serde(default)]
    pub delivery_address: String,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    pub note: Option<String>,
}

/// Order with its log history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub order_logs: Vec<OrderLog>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path_is_allowed() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Preparing));
        assert!(Preparing.can_transition_to(Dispatched));
        assert!(Dispatched.can_transition_to(Delivered));
    }

    #[test]
    fn test_cancel_allowed_from_every_non_terminal_status() {
        use OrderStatus::*;
        for status in [Pending, Confirmed, Preparing, Dispatched] {
            assert!(status.can_transition_to(Cancelled), "{status} -> cancelled");
        }
    }

    #[test]
    fn test_unlisted_pairs_are_rejected() {
        let listed = [
            ("pending", "confirmed"),
            ("pending", "cancelled"),
            ("confirmed", "preparing"),
            ("confirmed", "cancelled"),
            ("preparing", "dispatched"),
            ("preparing", "cancelled"),
            ("dispatched", "delivered"),
            ("dispatched", "cancelled"),
        ];
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = listed.contains(&(from.as_str(), to.as_str()));
                assert_eq!(from.can_transition_to(to), expected, "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Dispatched.is_terminal());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Dispatched).unwrap();
        assert_eq!(json, "\"dispatched\"");
        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("preparing".parse::<OrderStatus>(), Ok(OrderStatus::Preparing));
        assert!("PREPARING".parse::<OrderStatus>().is_err());
    }
}
