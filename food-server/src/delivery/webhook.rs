//! Porter webhook 处理
//!
//! 1. 按配送商订单号找到配送记录（找不到直接返回，不做任何修改）
//! 2. 同步前读取订单原状态
//! 3. 同步配送记录和订单状态（订单状态仍走状态转换表）
//! 4. 配送商主动取消且订单原本未取消时，后台触发改派

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::models::{OrderStatus, PorterDelivery};
use sqlx::SqlitePool;

use super::dispatch::PORTER_PARTNER;
use super::reassign::Reassigner;
use crate::core::{EngineError, EngineResult, Entity};
use crate::db::repository::delivery::{self, DeliveryEventUpdate};
use crate::lifecycle::OrderLifecycle;

pub const EVENT_ACCEPTED: &str = "order_accepted";
pub const EVENT_START_TRIP: &str = "order_start_trip";
pub const EVENT_END_JOB: &str = "order_end_job";
pub const EVENT_REOPEN: &str = "order_reopen";
pub const EVENT_CANCEL: &str = "order_cancel";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub status: String,
    /// Carrier-side order id
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub order_details: OrderDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDetails {
    /// Unix seconds
    #[serde(default)]
    pub event_ts: i64,
    pub partner_location: Option<PartnerLocation>,
    pub driver_details: Option<DriverDetails>,
    pub estimated_trip_fare: Option<f64>,
    pub actual_trip_fare: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerLocation {
    pub lat: f64,
    pub long: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriverDetails {
    #[serde(default)]
    pub driver_name: String,
    #[serde(default)]
    pub vehicle_number: String,
    #[serde(default)]
    pub mobile: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub message: String,
    pub porter_status: String,
    pub order_id: i64,
    pub porter_order_id: String,
    pub order_status: OrderStatus,
    pub reassignment_triggered: bool,
}

/// Carrier-facing body for an unknown carrier order id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookNotFound {
    pub error: String,
    pub porter_order_id: String,
    pub status: String,
}

impl WebhookNotFound {
    pub fn new(payload: &WebhookPayload) -> Self {
        Self {
            error: "Porter delivery not found".into(),
            porter_order_id: payload.order_id.clone(),
            status: payload.status.clone(),
        }
    }
}

/// Delivery row changes for a carrier event
pub fn delivery_update(payload: &WebhookPayload, now_millis: i64) -> DeliveryEventUpdate {
    let mut update = DeliveryEventUpdate {
        status: payload.status.clone(),
        ..Default::default()
    };
    match payload.status.as_str() {
        EVENT_ACCEPTED => {
            if let Some(driver) = &payload.order_details.driver_details {
                update.partner_name = Some(driver.driver_name.clone());
                update.partner_phone_number = Some(driver.mobile.clone());
                update.vehicle_number = Some(driver.vehicle_number.clone());
            }
            if payload.order_details.event_ts > 0 {
                update.estimated_delivery_time = Some(payload.order_details.event_ts * 1000);
            }
        }
        EVENT_START_TRIP => update.pickup_time = Some(now_millis),
        EVENT_END_JOB => update.actual_delivery_time = Some(now_millis),
        EVENT_REOPEN => update.clear_actual_delivery_time = true,
        EVENT_CANCEL => update.deactivate = true,
        _ => {}
    }
    update
}

/// Order status implied by a carrier event
pub fn order_status_for(event: &str) -> Option<OrderStatus> {
    match event {
        EVENT_ACCEPTED | EVENT_START_TRIP | EVENT_REOPEN => Some(OrderStatus::Dispatched),
        EVENT_END_JOB => Some(OrderStatus::Delivered),
        EVENT_CANCEL => Some(OrderStatus::Cancelled),
        _ => None,
    }
}

#[derive(Clone)]
pub struct WebhookService {
    pool: SqlitePool,
    orders: OrderLifecycle,
    reassigner: Arc<Reassigner>,
}

impl WebhookService {
    pub fn new(pool: SqlitePool, orders: OrderLifecycle, reassigner: Arc<Reassigner>) -> Self {
        Self {
            pool,
            orders,
            reassigner,
        }
    }

    /// Returns `NotFound { entity: Delivery }` when the carrier order id is unknown
    pub async fn handle(&self, payload: &WebhookPayload) -> EngineResult<WebhookResponse> {
        if payload.order_id.trim().is_empty() || payload.status.trim().is_empty() {
            return Err(EngineError::validation("Order ID and status are required"));
        }

        let existing: PorterDelivery = delivery::find_by_porter_order_id(&self.pool, &payload.order_id)
            .await?
            .ok_or_else(|| EngineError::not_found(Entity::Delivery, &payload.order_id))?;

        let original_status = self.orders.find(existing.order_id).await?.order_status;

        tracing::info!(
            order_id = %existing.order_id,
            porter_order_id = %payload.order_id,
            porter_status = %payload.status,
            "Porter webhook received"
        );

        let update = delivery_update(payload, shared::util::now_millis());
        delivery::apply_event(&self.pool, &payload.order_id, &update).await?;

        let order_status = self.sync_order_status(existing.order_id, original_status, &payload.status).await?;

        let reassignment_triggered =
            payload.status == EVENT_CANCEL && original_status != OrderStatus::Cancelled;
        if reassignment_triggered {
            tracing::warn!(
                order_id = %existing.order_id,
                porter_order_id = %payload.order_id,
                "Carrier cancelled the delivery, reassigning"
            );
            self.reassigner.trigger(existing.order_id, PORTER_PARTNER);
        }

        Ok(WebhookResponse {
            message: "Webhook processed successfully".into(),
            porter_status: payload.status.clone(),
            order_id: existing.order_id,
            porter_order_id: payload.order_id.clone(),
            order_status,
            reassignment_triggered,
        })
    }

    async fn sync_order_status(
        &self,
        order_id: i64,
        current: OrderStatus,
        event: &str,
    ) -> EngineResult<OrderStatus> {
        let Some(target) = order_status_for(event) else {
            return Ok(current);
        };
        if target == current {
            return Ok(current);
        }
        if !current.can_transition_to(target) {
            tracing::warn!(order_id = %order_id, from = %current, to = %target, event = %event, "Carrier event ignored by order status table");
            return Ok(current);
        }

        let note = format!("Porter: {event}");
        match self.orders.update_status(order_id, target, Some(&note)).await {
            Ok(order) => Ok(order.order_status),
            Err(EngineError::InvalidTransition { .. }) => {
                tracing::warn!(order_id = %order_id, to = %target, "Order status changed concurrently, carrier sync skipped");
                Ok(self.orders.find(order_id).await?.order_status)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::delivery::fakes::{FakeCarrier, RecordingDispatch};
    use crate::delivery::reassign::ReassignOutcome;
    use shared::models::{PorterDeliveryCreate, WeeklySchedule};
    use tokio::sync::mpsc;

    struct Harness {
        pool: SqlitePool,
        orders: OrderLifecycle,
        service: WebhookService,
        dispatch: Arc<RecordingDispatch>,
        outcomes: mpsc::UnboundedReceiver<ReassignOutcome>,
        order_id: i64,
    }

    async fn harness() -> Harness {
        let pool = fixtures::pool().await;
        let r = fixtures::restaurant(&pool, "A", WeeklySchedule::default()).await;
        let order = fixtures::order(&pool, r.id).await;
        delivery::create(
            &pool,
            PorterDeliveryCreate {
                order_id: order.id,
                porter_order_id: "CRN-1".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let dispatch = Arc::new(RecordingDispatch::new(pool.clone()));
        let (tx, outcomes) = mpsc::unbounded_channel();
        let reassigner = Arc::new(
            Reassigner::new(pool.clone(), dispatch.clone(), Arc::new(FakeCarrier::default())).with_hook(
                Arc::new(move |outcome| {
                    let _ = tx.send(outcome);
                }),
            ),
        );
        let orders = OrderLifecycle::new(pool.clone());
        Harness {
            service: WebhookService::new(pool.clone(), orders.clone(), reassigner),
            pool,
            orders,
            dispatch,
            outcomes,
            order_id: order.id,
        }
    }

    fn event(status: &str) -> WebhookPayload {
        WebhookPayload {
            status: status.into(),
            order_id: "CRN-1".into(),
            order_details: OrderDetails::default(),
        }
    }

    async fn advance_to(h: &Harness, target: OrderStatus) {
        for status in [OrderStatus::Confirmed, OrderStatus::Preparing, OrderStatus::Dispatched] {
            h.orders.update_status(h.order_id, status, None).await.unwrap();
            if status == target {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_carrier_order_changes_nothing() {
        let h = harness().await;
        let mut payload = event(EVENT_CANCEL);
        payload.order_id = "CRN-404".into();

        let err = h.service.handle(&payload).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound { entity: Entity::Delivery, .. }));
        assert_eq!(h.orders.find(h.order_id).await.unwrap().order_status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_blank_order_id_or_status_is_rejected() {
        let h = harness().await;
        for (order_id, status) in [("", EVENT_CANCEL), ("CRN-1", ""), ("  ", "  ")] {
            let payload = WebhookPayload {
                status: status.into(),
                order_id: order_id.into(),
                order_details: OrderDetails::default(),
            };
            let err = h.service.handle(&payload).await.unwrap_err();
            assert!(matches!(err, EngineError::Validation(_)), "{order_id:?}/{status:?}");
        }

        let row = delivery::find_by_porter_order_id(&h.pool, "CRN-1").await.unwrap().unwrap();
        assert!(row.is_active);
        assert!(h.dispatch.calls().is_empty());
    }

    #[tokio::test]
    async fn test_accepted_records_driver_and_dispatches_order() {
        let h = harness().await;
        advance_to(&h, OrderStatus::Preparing).await;

        let mut payload = event(EVENT_ACCEPTED);
        payload.order_details = OrderDetails {
            event_ts: 1_700_000_000,
            driver_details: Some(DriverDetails {
                driver_name: "Ravi".into(),
                vehicle_number: "KA01AB1234".into(),
                mobile: "9876543210".into(),
            }),
            ..Default::default()
        };
        let resp = h.service.handle(&payload).await.unwrap();
        assert_eq!(resp.order_status, OrderStatus::Dispatched);
        assert!(!resp.reassignment_triggered);

        let row = delivery::find_by_porter_order_id(&h.pool, "CRN-1").await.unwrap().unwrap();
        assert_eq!(row.status, EVENT_ACCEPTED);
        assert_eq!(row.partner_name.as_deref(), Some("Ravi"));
        assert_eq!(row.estimated_delivery_time, Some(1_700_000_000_000));
    }

    #[tokio::test]
    async fn test_disallowed_sync_is_ignored() {
        let h = harness().await;
        // pending -> delivered is not in the table
        let resp = h.service.handle(&event(EVENT_END_JOB)).await.unwrap();
        assert_eq!(resp.order_status, OrderStatus::Pending);
        let row = delivery::find_by_porter_order_id(&h.pool, "CRN-1").await.unwrap().unwrap();
        assert!(row.actual_delivery_time.is_some());
    }

    #[tokio::test]
    async fn test_cancel_of_dispatched_order_reassigns_once() {
        let mut h = harness().await;
        advance_to(&h, OrderStatus::Dispatched).await;

        let resp = h.service.handle(&event(EVENT_CANCEL)).await.unwrap();
        assert!(resp.reassignment_triggered);
        assert_eq!(resp.order_status, OrderStatus::Cancelled);

        let outcome = h.outcomes.recv().await.unwrap();
        assert_eq!(outcome.order_id, h.order_id);
        assert!(outcome.result.is_ok());
        assert_eq!(h.dispatch.calls(), vec![h.order_id]);
        assert!(h.outcomes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_of_cancelled_order_does_not_reassign() {
        let h = harness().await;
        h.orders
            .update_status(h.order_id, OrderStatus::Cancelled, None)
            .await
            .unwrap();

        let resp = h.service.handle(&event(EVENT_CANCEL)).await.unwrap();
        assert!(!resp.reassignment_triggered);
        // Give a wrongly spawned task the chance to run
        tokio::task::yield_now().await;
        assert!(h.dispatch.calls().is_empty());

        let row = delivery::find_by_porter_order_id(&h.pool, "CRN-1").await.unwrap().unwrap();
        assert!(!row.is_active);
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(order_status_for(EVENT_REOPEN), Some(OrderStatus::Dispatched));
        assert_eq!(order_status_for(EVENT_END_JOB), Some(OrderStatus::Delivered));
        assert_eq!(order_status_for("order_created"), None);

        let update = delivery_update(&event("order_created"), 5);
        assert_eq!(
            update,
            DeliveryEventUpdate {
                status: "order_created".into(),
                ..Default::default()
            }
        );
        assert!(delivery_update(&event(EVENT_REOPEN), 5).clear_actual_delivery_time);
    }
}
