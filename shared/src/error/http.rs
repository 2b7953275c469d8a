//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::OrderNotFound
            | Self::RefundNotFound
            | Self::RestaurantNotFound
            | Self::ProductNotFound
            | Self::TimeGroupNotFound
            | Self::DeliveryNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::OrderInvalidTransition
            | Self::RefundInvalidTransition
            | Self::RefundAlreadyExists
            | Self::SchedulerAlreadyRunning => StatusCode::CONFLICT,

            // 422 Unprocessable (business rule)
            Self::RefundOrderNotDelivered | Self::DeliveryPartnerUnsupported => {
                StatusCode::UNPROCESSABLE_ENTITY
            }

            // 502 Bad Gateway (carrier / third-party)
            Self::UpstreamError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown | Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation errors)
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RefundAmountInvalid
            | Self::RestaurantScheduleInvalid => StatusCode::BAD_REQUEST,
        }
    }
}
