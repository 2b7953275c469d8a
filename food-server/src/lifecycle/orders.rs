//! Order lifecycle
//!
//! Every status change is checked against [`OrderStatus::allowed_transitions`]
//! and written as a compare-and-set on the status read at the start, so two
//! concurrent requests cannot both succeed from the same status.

use shared::models::{Order, OrderCreate, OrderDetail, OrderLog, OrderStatus};
use sqlx::SqlitePool;

use crate::core::{EngineError, EngineResult, Entity};
use crate::db::repository::{order, restaurant};
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_text_len};

#[derive(Clone)]
pub struct OrderLifecycle {
    pool: SqlitePool,
}

impl OrderLifecycle {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Place a `pending` order
    pub async fn create(&self, data: OrderCreate) -> EngineResult<Order> {
        if !data.total_amount.is_finite() || data.total_amount < 0.0 {
            return Err(EngineError::validation(format!(
                "total_amount must be a non-negative number, got {}",
                data.total_amount
            )));
        }
        validate_text_len(&data.customer_name, "customer_name", MAX_NAME_LEN)?;
        validate_text_len(&data.delivery_address, "delivery_address", MAX_NOTE_LEN)?;

        if restaurant::find_by_id(&self.pool, data.restaurant_id).await?.is_none() {
            return Err(EngineError::not_found(Entity::Restaurant, data.restaurant_id));
        }

        let order = order::create(&self.pool, data).await?;
        tracing::info!(order_id = %order.id, restaurant_id = %order.restaurant_id, "Order placed");
        Ok(order)
    }

    pub async fn find(&self, order_id: i64) -> EngineResult<Order> {
        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| EngineError::not_found(Entity::Order, order_id))
    }

    /// Order with its log history
    pub async fn get(&self, order_id: i64) -> EngineResult<OrderDetail> {
        let order = self.find(order_id).await?;
        let order_logs = order::find_logs(&self.pool, order_id).await?;
        Ok(OrderDetail { order, order_logs })
    }

    pub async fn logs(&self, order_id: i64) -> EngineResult<Vec<OrderLog>> {
        self.find(order_id).await?;
        Ok(order::find_logs(&self.pool, order_id).await?)
    }

    /// Move an order to `requested`
    ///
    /// Fails with `InvalidTransition` when the table forbids the change or
    /// when another writer changed the status first; nothing is written then.
    pub async fn update_status(
        &self,
        order_id: i64,
        requested: OrderStatus,
        note: Option<&str>,
    ) -> EngineResult<Order> {
        let current = self.find(order_id).await?;
        let from = current.order_status;

        if !from.can_transition_to(requested) {
            return Err(EngineError::invalid_transition(Entity::Order, from, requested));
        }

        let default_note;
        let note = match note.map(str::trim).filter(|n| !n.is_empty()) {
            Some(n) => n,
            None => {
                default_note = format!("Status updated to {requested}");
                &default_note
            }
        };

        if !order::transition(&self.pool, order_id, from, requested, note).await? {
            tracing::warn!(order_id = %order_id, from = %from, to = %requested, "Order status changed concurrently");
            return Err(EngineError::invalid_transition(Entity::Order, from, requested));
        }

        tracing::info!(order_id = %order_id, from = %from, to = %requested, "Order status updated");
        self.find(order_id).await
    }
}
