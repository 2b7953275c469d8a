//! Refund lifecycle

use shared::models::{OrderStatus, Refund, RefundCreate, RefundStatus};
use sqlx::SqlitePool;

use crate::core::{EngineError, EngineResult, Entity};
use crate::db::repository::{RepoError, order, refund};
use crate::utils::types::{Page, PaginationParams};
use crate::utils::validation::{MAX_NOTE_LEN, validate_text_len};
use crate::utils::{AppError, ErrorCode};

#[derive(Clone)]
pub struct RefundService {
    pool: SqlitePool,
}

impl RefundService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a `pending` refund for a delivered order
    pub async fn create(&self, data: RefundCreate) -> EngineResult<Refund> {
        validate_text_len(&data.reason, "reason", MAX_NOTE_LEN)?;

        let order = order::find_by_id(&self.pool, data.order_id)
            .await?
            .ok_or_else(|| EngineError::not_found(Entity::Order, data.order_id))?;

        if order.order_status != OrderStatus::Delivered {
            return Err(EngineError::Validation(
                AppError::new(ErrorCode::RefundOrderNotDelivered)
                    .with_detail("order_status", order.order_status.as_str()),
            ));
        }
        if !data.amount.is_finite() || data.amount <= 0.0 || data.amount > order.total_amount {
            return Err(EngineError::Validation(
                AppError::with_message(
                    ErrorCode::RefundAmountInvalid,
                    format!(
                        "Refund amount must be greater than 0 and at most {}",
                        order.total_amount
                    ),
                )
                .with_detail("amount", data.amount),
            ));
        }

        let order_id = data.order_id;
        let already_exists = || {
            EngineError::Conflict(
                AppError::new(ErrorCode::RefundAlreadyExists).with_detail("order_id", order_id),
            )
        };
        if refund::find_by_order(&self.pool, data.order_id).await?.is_some() {
            return Err(already_exists());
        }

        let created = match refund::create(&self.pool, data.order_id, data.amount, &data.reason).await {
            Ok(r) => r,
            // Lost a race with another create for the same order
            Err(RepoError::Duplicate(_)) => return Err(already_exists()),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(refund_id = %created.id, order_id = %created.order_id, amount = created.amount, "Refund requested");
        Ok(created)
    }

    pub async fn get(&self, refund_id: i64) -> EngineResult<Refund> {
        refund::find_by_id(&self.pool, refund_id)
            .await?
            .ok_or_else(|| EngineError::not_found(Entity::Refund, refund_id))
    }

    pub async fn list_by_status(
        &self,
        status: Option<RefundStatus>,
        page: &PaginationParams,
    ) -> EngineResult<Page<Refund>> {
        let items = refund::find_all(&self.pool, status, page.limit(), page.offset()).await?;
        Ok(Page {
            items,
            page: page.page.max(1),
            page_size: page.limit() as u32,
        })
    }

    /// Move a refund to `requested` if the table allows it
    pub async fn update_status(&self, refund_id: i64, requested: RefundStatus) -> EngineResult<Refund> {
        let current = self.get(refund_id).await?;
        let from = current.status;

        if !from.can_transition_to(requested) {
            return Err(EngineError::invalid_transition(Entity::Refund, from, requested));
        }
        if !refund::transition(&self.pool, refund_id, from, requested).await? {
            return Err(EngineError::invalid_transition(Entity::Refund, from, requested));
        }

        tracing::info!(refund_id = %refund_id, from = %from, to = %requested, "Refund status updated");
        self.get(refund_id).await
    }

    /// Mark an approved refund as paid out
    pub async fn process(&self, refund_id: i64) -> EngineResult<Refund> {
        let current = self.get(refund_id).await?;
        if current.status != RefundStatus::Approved {
            return Err(EngineError::invalid_transition(
                Entity::Refund,
                current.status,
                RefundStatus::Processed,
            ));
        }
        self.update_status(refund_id, RefundStatus::Processed).await
    }
}
