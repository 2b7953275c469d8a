//! 配送下单
//!
//! 餐厅为取货点，订单收货人为送达点。下单成功后写入一条新的有效配送记录。

use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{Order, PorterDeliveryCreate, Restaurant};
use sqlx::SqlitePool;

use super::carrier::{
    Address, AddressDetails, CarrierClient, ContactDetails, CreateOrderRequest, DeliveryInstructions,
    Instruction,
};
use crate::core::{EngineError, EngineResult, Entity};
use crate::db::repository::{delivery, restaurant};

pub const PORTER_PARTNER: &str = "porter";

/// Places a carrier order for a food order and records it
#[async_trait]
pub trait DeliveryDispatch: Send + Sync {
    /// Returns the new carrier order id
    async fn create_delivery_order(&self, order: &Order, partner: &str) -> EngineResult<String>;
}

pub struct PorterDispatcher {
    pool: SqlitePool,
    carrier: Arc<dyn CarrierClient>,
}

impl PorterDispatcher {
    pub fn new(pool: SqlitePool, carrier: Arc<dyn CarrierClient>) -> Self {
        Self { pool, carrier }
    }
}

/// `FOOD_<order-id>_<unix-seconds>`
pub fn request_id(order_id: i64, unix_secs: i64) -> String {
    format!("FOOD_{order_id}_{unix_secs}")
}

pub fn build_create_request(order: &Order, restaurant: &Restaurant, unix_secs: i64) -> CreateOrderRequest {
    let pickup = Address {
        apartment_address: restaurant.name.clone(),
        street_address1: "Restaurant Location".into(),
        street_address2: format!("Restaurant - {}", restaurant.name),
        landmark: "Restaurant Area".into(),
        country: "India".into(),
        contact_details: ContactDetails {
            name: restaurant.name.clone(),
            phone_number: restaurant.contact_number.clone().unwrap_or_default(),
        },
        ..Address::default()
    };
    let drop = Address {
        street_address1: order.delivery_address.clone(),
        street_address2: format!("Order ID: {}", order.id),
        country: "India".into(),
        contact_details: ContactDetails {
            name: order.customer_name.clone(),
            phone_number: order.customer_contact.clone(),
        },
        ..Address::default()
    };

    CreateOrderRequest {
        request_id: request_id(order.id, unix_secs),
        delivery_instructions: Some(DeliveryInstructions {
            instructions_list: vec![Instruction {
                kind: "text".into(),
                description: "Handle with care - Food delivery".into(),
            }],
        }),
        pickup_details: AddressDetails { address: pickup },
        drop_details: AddressDetails { address: drop },
        additional_comments: Some(format!(
            "Food delivery from {}. Order value: ₹{:.2}",
            restaurant.name, order.total_amount
        )),
    }
}

#[async_trait]
impl DeliveryDispatch for PorterDispatcher {
    async fn create_delivery_order(&self, order: &Order, partner: &str) -> EngineResult<String> {
        if partner != PORTER_PARTNER {
            return Err(EngineError::Upstream(format!(
                "delivery partner not yet implemented: {partner}"
            )));
        }

        let restaurant = restaurant::find_by_id(&self.pool, order.restaurant_id)
            .await?
            .ok_or_else(|| EngineError::not_found(Entity::Restaurant, order.restaurant_id))?;

        let request = build_create_request(order, &restaurant, chrono::Utc::now().timestamp());
        let created = self.carrier.create_order(&request).await?;

        let estimated = (created.estimated_pickup_time > 0).then(|| created.estimated_pickup_time * 1000);
        let tracking_url = (!created.tracking_url.is_empty()).then(|| created.tracking_url.clone());
        let row = delivery::create(
            &self.pool,
            PorterDeliveryCreate {
                order_id: order.id,
                porter_order_id: created.order_id.clone(),
                tracking_url,
                estimated_delivery_time: estimated,
                delivery_fee: created.estimated_fare_details.minor_amount as f64 / 100.0,
            },
        )
        .await?;

        tracing::info!(
            order_id = %order.id,
            porter_order_id = %row.porter_order_id,
            request_id = %request.request_id,
            fee = row.delivery_fee,
            "Porter delivery created"
        );
        Ok(row.porter_order_id)
    }
}
