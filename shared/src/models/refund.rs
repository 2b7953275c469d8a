//! Refund Model
//!
//! ```text
//! pending   -> approved | rejected
//! approved  -> processed | failed
//! failed    -> approved          (retry)
//! rejected  -> (terminal)
//! processed -> (terminal)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum RefundStatus {
    Pending,
    Approved,
    Rejected,
    Processed,
    Failed,
}

impl RefundStatus {
    pub const ALL: [RefundStatus; 5] = [
        RefundStatus::Pending,
        RefundStatus::Approved,
        RefundStatus::Rejected,
        RefundStatus::Processed,
        RefundStatus::Failed,
    ];

    pub const fn allowed_transitions(self) -> &'static [RefundStatus] {
        match self {
            RefundStatus::Pending => &[RefundStatus::Approved, RefundStatus::Rejected],
            RefundStatus::Approved => &[RefundStatus::Processed, RefundStatus::Failed],
            RefundStatus::Failed => &[RefundStatus::Approved],
            RefundStatus::Rejected | RefundStatus::Processed => &[],
        }
    }

    pub fn can_transition_to(self, next: RefundStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            RefundStatus::Pending => "pending",
            RefundStatus::Approved => "approved",
            RefundStatus::Rejected => "rejected",
            RefundStatus::Processed => "processed",
            RefundStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Refund {
    pub id: i64,
    pub order_id: i64,
    pub amount: f64,
    pub reason: String,
    pub status: RefundStatus,
    pub processed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundCreate {
    pub order_id: i64,
    pub amount: f64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundStatusUpdate {
    pub status: RefundStatus,
}
