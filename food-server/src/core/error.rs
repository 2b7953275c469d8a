//! 业务核心错误
//!
//! 状态机、调度器、配送改派共用的错误分类。HTTP 层通过
//! `From<EngineError> for AppError` 转换成统一的错误码响应。

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::{AppError, ErrorCode};

/// Entity a transition or lookup refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Restaurant,
    Order,
    Refund,
    Delivery,
    Product,
    TimeGroup,
}

impl Entity {
    pub fn name(self) -> &'static str {
        match self {
            Entity::Restaurant => "Restaurant",
            Entity::Order => "Order",
            Entity::Refund => "Refund",
            Entity::Delivery => "Delivery",
            Entity::Product => "Product",
            Entity::TimeGroup => "Time group",
        }
    }

    fn not_found_code(self) -> ErrorCode {
        match self {
            Entity::Restaurant => ErrorCode::RestaurantNotFound,
            Entity::Order => ErrorCode::OrderNotFound,
            Entity::Refund => ErrorCode::RefundNotFound,
            Entity::Delivery => ErrorCode::DeliveryNotFound,
            Entity::Product => ErrorCode::ProductNotFound,
            Entity::TimeGroup => ErrorCode::TimeGroupNotFound,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Status change not in the table, or lost a concurrent update
    #[error("Invalid {} status transition from {from} to {to}", entity.name().to_lowercase())]
    InvalidTransition {
        entity: Entity,
        from: String,
        to: String,
    },

    #[error("{} {id} not found", entity.name())]
    NotFound { entity: Entity, id: String },

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    #[error("Automatic status management is already running")]
    AlreadyRunning,

    #[error("{0}")]
    Validation(AppError),

    #[error("{0}")]
    Conflict(AppError),
}

impl EngineError {
    pub fn not_found(entity: Entity, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_transition(entity: Entity, from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            entity,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(AppError::validation(msg))
    }
}

impl From<RepoError> for EngineError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => Self::Persistence(format!("row vanished: {msg}")),
            RepoError::Duplicate(msg) => {
                Self::Conflict(AppError::with_message(ErrorCode::AlreadyExists, msg))
            }
            RepoError::Database(msg) => Self::Persistence(msg),
        }
    }
}

impl From<AppError> for EngineError {
    fn from(err: AppError) -> Self {
        Self::Validation(err)
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidTransition { entity, from, to } => {
                let code = match entity {
                    Entity::Refund => ErrorCode::RefundInvalidTransition,
                    _ => ErrorCode::OrderInvalidTransition,
                };
                AppError::invalid_transition(code, &from, &to)
            }
            EngineError::NotFound { entity, id } => AppError::with_message(
                entity.not_found_code(),
                format!("{} {} not found", entity.name(), id),
            )
            .with_detail("id", id),
            EngineError::Persistence(msg) => AppError::database(msg),
            EngineError::Upstream(msg) => AppError::upstream(msg),
            EngineError::AlreadyRunning => AppError::new(ErrorCode::SchedulerAlreadyRunning),
            EngineError::Validation(e) | EngineError::Conflict(e) => e,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// 业务核心 Result 类型别名
pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_invalid_transition_maps_per_entity() {
        let err: AppError = EngineError::invalid_transition(Entity::Order, "delivered", "pending").into();
        assert_eq!(err.code, ErrorCode::OrderInvalidTransition);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let err: AppError = EngineError::invalid_transition(Entity::Refund, "rejected", "approved").into();
        assert_eq!(err.code, ErrorCode::RefundInvalidTransition);
    }

    #[test]
    fn test_not_found_maps_per_entity() {
        let err: AppError = EngineError::not_found(Entity::Delivery, "PORTER_1").into();
        assert_eq!(err.code, ErrorCode::DeliveryNotFound);
        assert_eq!(err.message, "Delivery PORTER_1 not found");
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_system_errors() {
        let err: AppError = EngineError::Persistence("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        let err: AppError = EngineError::Upstream("timeout".into()).into();
        assert_eq!(err.http_status(), StatusCode::BAD_GATEWAY);
        let err: AppError = EngineError::AlreadyRunning.into();
        assert_eq!(err.code, ErrorCode::SchedulerAlreadyRunning);
    }

    #[test]
    fn test_display() {
        let err = EngineError::invalid_transition(Entity::Order, "cancelled", "confirmed");
        assert_eq!(
            err.to_string(),
            "Invalid order status transition from cancelled to confirmed"
        );
    }
}
