//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 4xxx: Order errors
/// - 5xxx: Payment and refund errors
/// - 6xxx: Restaurant errors
/// - 7xxx: Delivery errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Order errors (4xxx)
    Order,
    /// Payment / refund errors (5xxx)
    Payment,
    /// Restaurant errors (6xxx)
    Restaurant,
    /// Delivery errors (7xxx)
    Delivery,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..4000 => Self::General,
            4000..5000 => Self::Order,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Restaurant,
            7000..8000 => Self::Delivery,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Order => "order",
            Self::Payment => "payment",
            Self::Restaurant => "restaurant",
            Self::Delivery => "delivery",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
