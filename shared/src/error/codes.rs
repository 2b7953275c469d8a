//! Unified error codes for the food platform
//!
//! This module defines all error codes used across food-server and its API clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment and refund errors
//! - 6xxx: Restaurant and catalog errors
//! - 7xxx: Delivery errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Requested order status change is not allowed
    OrderInvalidTransition = 4002,

    // ==================== 5xxx: Payment / Refund ====================
    /// Refund not found
    RefundNotFound = 5101,
    /// Requested refund status change is not allowed
    RefundInvalidTransition = 5102,
    /// Refund amount is zero, negative or above the order total
    RefundAmountInvalid = 5103,
    /// A refund already exists for this order
    RefundAlreadyExists = 5104,
    /// Refunds are only accepted for delivered orders
    RefundOrderNotDelivered = 5105,

    // ==================== 6xxx: Restaurant ====================
    /// Restaurant not found
    RestaurantNotFound = 6001,
    /// Opening hours contain an invalid time
    RestaurantScheduleInvalid = 6002,
    /// Product not found
    ProductNotFound = 6101,
    /// Time range group not found
    TimeGroupNotFound = 6201,

    // ==================== 7xxx: Delivery ====================
    /// Delivery record not found
    DeliveryNotFound = 7001,
    /// Delivery partner is not supported
    DeliveryPartnerUnsupported = 7002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Upstream (carrier / third-party) API error
    UpstreamError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Automatic status scheduler is already running
    SchedulerAlreadyRunning = 9101,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderInvalidTransition => "Invalid order status transition",

            // Refund
            ErrorCode::RefundNotFound => "Refund not found",
            ErrorCode::RefundInvalidTransition => "Invalid refund status transition",
            ErrorCode::RefundAmountInvalid => "Refund amount is invalid",
            ErrorCode::RefundAlreadyExists => "Refund already exists for this order",
            ErrorCode::RefundOrderNotDelivered => "Refunds can only be requested for delivered orders",

            // Restaurant
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::RestaurantScheduleInvalid => "Opening hours are invalid",
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::TimeGroupNotFound => "Time group not found",

            // Delivery
            ErrorCode::DeliveryNotFound => "Delivery not found",
            ErrorCode::DeliveryPartnerUnsupported => "Delivery partner not yet implemented",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::UpstreamError => "Upstream service error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::SchedulerAlreadyRunning => "Automatic status management is already running",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderInvalidTransition),

            // Refund
            5101 => Ok(ErrorCode::RefundNotFound),
            5102 => Ok(ErrorCode::RefundInvalidTransition),
            5103 => Ok(ErrorCode::RefundAmountInvalid),
            5104 => Ok(ErrorCode::RefundAlreadyExists),
            5105 => Ok(ErrorCode::RefundOrderNotDelivered),

            // Restaurant
            6001 => Ok(ErrorCode::RestaurantNotFound),
            6002 => Ok(ErrorCode::RestaurantScheduleInvalid),
            6101 => Ok(ErrorCode::ProductNotFound),
            6201 => Ok(ErrorCode::TimeGroupNotFound),

            // Delivery
            7001 => Ok(ErrorCode::DeliveryNotFound),
            7002 => Ok(ErrorCode::DeliveryPartnerUnsupported),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::UpstreamError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9101 => Ok(ErrorCode::SchedulerAlreadyRunning),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::OrderInvalidTransition.code(), 4002);
        assert_eq!(ErrorCode::RefundInvalidTransition.code(), 5102);
        assert_eq!(ErrorCode::RestaurantNotFound.code(), 6001);
        assert_eq!(ErrorCode::DeliveryNotFound.code(), 7001);
        assert_eq!(ErrorCode::SchedulerAlreadyRunning.code(), 9101);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(4002), Ok(ErrorCode::OrderInvalidTransition));
        assert_eq!(ErrorCode::try_from(9003), Ok(ErrorCode::UpstreamError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(1001), Err(InvalidErrorCode(1001)));
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::RefundNotFound).unwrap();
        assert_eq!(json, "5101");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("7002").unwrap();
        assert_eq!(code, ErrorCode::DeliveryPartnerUnsupported);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
        assert_eq!(ErrorCode::OrderNotFound.to_string(), "E4001");
    }

    #[test]
    fn test_every_code_roundtrips_through_u16() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidFormat,
            ErrorCode::OrderNotFound,
            ErrorCode::OrderInvalidTransition,
            ErrorCode::RefundNotFound,
            ErrorCode::RefundInvalidTransition,
            ErrorCode::RefundAmountInvalid,
            ErrorCode::RefundAlreadyExists,
            ErrorCode::RefundOrderNotDelivered,
            ErrorCode::RestaurantNotFound,
            ErrorCode::RestaurantScheduleInvalid,
            ErrorCode::ProductNotFound,
            ErrorCode::TimeGroupNotFound,
            ErrorCode::DeliveryNotFound,
            ErrorCode::DeliveryPartnerUnsupported,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::UpstreamError,
            ErrorCode::TimeoutError,
            ErrorCode::ConfigError,
            ErrorCode::SchedulerAlreadyRunning,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
            assert!(!code.message().is_empty());
        }
    }
}
