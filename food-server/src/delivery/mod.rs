//! 第三方配送 (Porter)
//!
//! - [`carrier`]: Porter REST 客户端
//! - [`dispatch`]: 为订单下配送单并记录
//! - [`reassign`]: 配送商取消后的改派
//! - [`webhook`]: 配送事件同步

pub mod carrier;
pub mod dispatch;
pub mod reassign;
pub mod webhook;

pub use carrier::{CarrierClient, PorterClient};
pub use dispatch::{DeliveryDispatch, PORTER_PARTNER, PorterDispatcher};
pub use reassign::{ReassignHook, ReassignOutcome, Reassigner};
pub use webhook::{WebhookNotFound, WebhookPayload, WebhookResponse, WebhookService};

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::atomic::{AtomicU64, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use shared::models::{Order, PorterDeliveryCreate};
    use sqlx::SqlitePool;

    use super::carrier::*;
    use super::dispatch::DeliveryDispatch;
    use crate::core::{EngineError, EngineResult};
    use crate::db::repository::delivery;

    /// In-memory carrier; optionally fails every cancel
    #[derive(Default)]
    pub struct FakeCarrier {
        fail_cancel: bool,
        seq: AtomicU64,
        created: Mutex<Vec<CreateOrderRequest>>,
        cancelled: Mutex<Vec<String>>,
    }

    impl FakeCarrier {
        pub fn failing_cancel() -> Self {
            Self {
                fail_cancel: true,
                ..Default::default()
            }
        }

        pub fn created_requests(&self) -> Vec<CreateOrderRequest> {
            self.created.lock().clone()
        }

        pub fn cancelled(&self) -> Vec<String> {
            self.cancelled.lock().clone()
        }
    }

    #[async_trait]
    impl CarrierClient for FakeCarrier {
        async fn create_order(&self, request: &CreateOrderRequest) -> EngineResult<CreateOrderResponse> {
            self.created.lock().push(request.clone());
            let n = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(CreateOrderResponse {
                request_id: request.request_id.clone(),
                order_id: format!("CRN-NEW-{n}"),
                estimated_pickup_time: 1_700_000_600,
                estimated_fare_details: FareDetails {
                    currency: "INR".into(),
                    minor_amount: 5900,
                },
                tracking_url: format!("https://track.example/CRN-NEW-{n}"),
            })
        }

        async fn cancel_order(&self, carrier_order_id: &str) -> EngineResult<CancelOrderResponse> {
            if self.fail_cancel {
                return Err(EngineError::Upstream(format!(
                    "Porter API error (status 409): order {carrier_order_id} cannot be cancelled"
                )));
            }
            self.cancelled.lock().push(carrier_order_id.to_string());
            Ok(CancelOrderResponse {
                code: 200,
                message: "cancelled".into(),
            })
        }

        async fn track_order(&self, carrier_order_id: &str) -> EngineResult<TrackOrderResponse> {
            Ok(TrackOrderResponse {
                order_id: carrier_order_id.to_string(),
                status: "live".into(),
                partner_info: None,
                order_timings: OrderTimings::default(),
                fare_details: None,
            })
        }
    }

    /// Records dispatched order ids and inserts a delivery row for each
    pub struct RecordingDispatch {
        pool: SqlitePool,
        calls: Mutex<Vec<i64>>,
    }

    impl RecordingDispatch {
        pub fn new(pool: SqlitePool) -> Self {
            Self {
                pool,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<i64> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl DeliveryDispatch for RecordingDispatch {
        async fn create_delivery_order(&self, order: &Order, _partner: &str) -> EngineResult<String> {
            let n = {
                let mut calls = self.calls.lock();
                calls.push(order.id);
                calls.len()
            };
            let row = delivery::create(
                &self.pool,
                PorterDeliveryCreate {
                    order_id: order.id,
                    porter_order_id: format!("CRN-R{}-{n}", order.id),
                    ..Default::default()
                },
            )
            .await?;
            Ok(row.porter_order_id)
        }
    }
}
