//! 配送改派
//!
//! 配送商主动取消后重新下单。`trigger` 在后台执行并限时 30 秒，
//! webhook 响应不等待结果；手动改派接口直接调用 `reassign`。

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;

use super::carrier::CarrierClient;
use super::dispatch::{DeliveryDispatch, PORTER_PARTNER};
use crate::core::{EngineError, EngineResult, Entity};
use crate::db::repository::{delivery, order};

pub const REASSIGN_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of one detached reassignment
#[derive(Debug, Clone, PartialEq)]
pub struct ReassignOutcome {
    pub order_id: i64,
    pub partner: String,
    /// New carrier order id, or the error text
    pub result: Result<String, String>,
}

pub type ReassignHook = Arc<dyn Fn(ReassignOutcome) + Send + Sync>;

pub struct Reassigner {
    pool: SqlitePool,
    dispatch: Arc<dyn DeliveryDispatch>,
    carrier: Arc<dyn CarrierClient>,
    hook: Option<ReassignHook>,
}

impl Reassigner {
    pub fn new(pool: SqlitePool, dispatch: Arc<dyn DeliveryDispatch>, carrier: Arc<dyn CarrierClient>) -> Self {
        Self {
            pool,
            dispatch,
            carrier,
            hook: None,
        }
    }

    /// Called with the outcome of every `trigger`ed reassignment
    pub fn with_hook(mut self, hook: ReassignHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Run `reassign` in the background and return immediately
    pub fn trigger(self: &Arc<Self>, order_id: i64, partner: &str) {
        let this = Arc::clone(self);
        let partner = partner.to_string();
        tokio::spawn(async move {
            let result = match tokio::time::timeout(REASSIGN_TIMEOUT, this.reassign(order_id, &partner)).await {
                Ok(Ok(new_id)) => Ok(new_id),
                Ok(Err(e)) => {
                    tracing::error!(order_id = %order_id, partner = %partner, error = %e, "Delivery reassignment failed");
                    Err(e.to_string())
                }
                Err(_) => {
                    tracing::error!(order_id = %order_id, partner = %partner, "Delivery reassignment timed out");
                    Err(format!("reassignment timed out after {}s", REASSIGN_TIMEOUT.as_secs()))
                }
            };
            if let Some(hook) = &this.hook {
                hook(ReassignOutcome {
                    order_id,
                    partner,
                    result,
                });
            }
        });
    }

    /// Deactivate the current delivery, cancel it upstream and dispatch again
    ///
    /// Returns the new carrier order id.
    pub async fn reassign(&self, order_id: i64, partner: &str) -> EngineResult<String> {
        if partner != PORTER_PARTNER {
            return Err(EngineError::Upstream(format!(
                "delivery partner not yet implemented: {partner}"
            )));
        }

        let order = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| EngineError::not_found(Entity::Order, order_id))?;

        let stale = delivery::find_active_by_order(&self.pool, order_id).await?;
        let deactivated = delivery::deactivate_all_for_order(&self.pool, order_id).await?;
        if deactivated > 0 {
            tracing::info!(order_id = %order_id, count = deactivated, "Deactivated previous deliveries");
        }

        for old in &stale {
            if let Err(e) = self.carrier.cancel_order(&old.porter_order_id).await {
                tracing::warn!(
                    order_id = %order_id,
                    porter_order_id = %old.porter_order_id,
                    error = %e,
                    "Failed to cancel previous carrier order"
                );
            }
        }

        match self.dispatch.create_delivery_order(&order, partner).await {
            Ok(new_id) => {
                tracing::info!(order_id = %order_id, porter_order_id = %new_id, "Delivery reassigned");
                Ok(new_id)
            }
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Order left without an active delivery");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::delivery::fakes::{FakeCarrier, RecordingDispatch};
    use shared::models::{PorterDeliveryCreate, WeeklySchedule};

    async fn setup(carrier: FakeCarrier) -> (SqlitePool, Arc<FakeCarrier>, Arc<RecordingDispatch>, i64) {
        let pool = fixtures::pool().await;
        let r = fixtures::restaurant(&pool, "A", WeeklySchedule::default()).await;
        let order = fixtures::order(&pool, r.id).await;
        delivery::create(
            &pool,
            PorterDeliveryCreate {
                order_id: order.id,
                porter_order_id: "CRN-OLD".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let dispatch = Arc::new(RecordingDispatch::new(pool.clone()));
        (pool, Arc::new(carrier), dispatch, order.id)
    }

    #[tokio::test]
    async fn test_reassign_replaces_active_delivery() {
        let (pool, carrier, dispatch, order_id) = setup(FakeCarrier::default()).await;
        let reassigner = Reassigner::new(pool.clone(), dispatch.clone(), carrier.clone());

        let new_id = reassigner.reassign(order_id, "porter").await.unwrap();

        assert_eq!(carrier.cancelled(), vec!["CRN-OLD".to_string()]);
        assert_eq!(dispatch.calls(), vec![order_id]);
        let active = delivery::find_active_by_order(&pool, order_id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].porter_order_id, new_id);
        assert_eq!(delivery::find_by_order(&pool, order_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cancel_failure_does_not_block_dispatch() {
        let (pool, carrier, dispatch, order_id) = setup(FakeCarrier::failing_cancel()).await;
        let reassigner = Reassigner::new(pool.clone(), dispatch.clone(), carrier);

        reassigner.reassign(order_id, "porter").await.unwrap();
        assert_eq!(dispatch.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_partner_and_order() {
        let (pool, carrier, dispatch, order_id) = setup(FakeCarrier::default()).await;
        let reassigner = Reassigner::new(pool.clone(), dispatch.clone(), carrier);

        assert!(matches!(
            reassigner.reassign(order_id, "dunzo").await,
            Err(EngineError::Upstream(_))
        ));
        assert!(matches!(
            reassigner.reassign(order_id + 1, "porter").await,
            Err(EngineError::NotFound { entity: Entity::Order, .. })
        ));
        assert!(dispatch.calls().is_empty());
        // Nothing was deactivated
        assert_eq!(delivery::find_active_by_order(&pool, order_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_trigger_reports_through_hook() {
        let (pool, carrier, dispatch, order_id) = setup(FakeCarrier::default()).await;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let reassigner = Arc::new(
            Reassigner::new(pool, dispatch, carrier).with_hook(Arc::new(move |outcome| {
                let _ = tx.send(outcome);
            })),
        );

        reassigner.trigger(order_id, "porter");
        let outcome = rx.recv().await.unwrap();
        assert_eq!(outcome.order_id, order_id);
        assert!(outcome.result.is_ok());

        reassigner.trigger(order_id, "dunzo");
        let outcome = rx.recv().await.unwrap();
        assert!(outcome.result.is_err());
    }
}
