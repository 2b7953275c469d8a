//! Porter REST client (no SDK dependency)
//!
//! Only 200 and 201 count as success; any other status is surfaced as
//! `EngineError::Upstream` with the raw body attached.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::core::{Config, EngineError, EngineResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_instructions: Option<DeliveryInstructions>,
    pub pickup_details: AddressDetails,
    pub drop_details: AddressDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryInstructions {
    pub instructions_list: Vec<Instruction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressDetails {
    pub address: Address,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub apartment_address: String,
    pub street_address1: String,
    pub street_address2: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub lat: f64,
    pub lng: f64,
    pub contact_details: ContactDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FareDetails {
    #[serde(default)]
    pub currency: String,
    /// 最小货币单位 (paise)
    #[serde(default)]
    pub minor_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    #[serde(default)]
    pub request_id: String,
    pub order_id: String,
    /// Unix seconds
    #[serde(default)]
    pub estimated_pickup_time: i64,
    #[serde(default)]
    pub estimated_fare_details: FareDetails,
    #[serde(default)]
    pub tracking_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vehicle_number: String,
    #[serde(default)]
    pub mobile: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderTimings {
    pub pickup_time: Option<i64>,
    pub order_accepted_time: Option<i64>,
    pub order_started_time: Option<i64>,
    pub order_ended_time: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackOrderResponse {
    pub order_id: String,
    pub status: String,
    pub partner_info: Option<PartnerInfo>,
    #[serde(default)]
    pub order_timings: OrderTimings,
    pub fare_details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelOrderResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Carrier-side order operations
#[async_trait]
pub trait CarrierClient: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> EngineResult<CreateOrderResponse>;

    async fn cancel_order(&self, carrier_order_id: &str) -> EngineResult<CancelOrderResponse>;

    async fn track_order(&self, carrier_order_id: &str) -> EngineResult<TrackOrderResponse>;
}

pub struct PorterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PorterClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> EngineResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Upstream(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> EngineResult<Self> {
        Self::new(
            config.porter_base_url.clone(),
            config.porter_api_key.clone(),
            Duration::from_millis(config.carrier_timeout_ms),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> EngineResult<T> {
        let resp = request
            .header("X-API-KEY", &self.api_key)
            .send()
            .await
            .map_err(|e| EngineError::Upstream(format!("Porter request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| EngineError::Upstream(format!("Failed to read Porter response: {e}")))?;

        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
            return Err(EngineError::Upstream(format!(
                "Porter API error (status {}): {}",
                status.as_u16(),
                body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| EngineError::Upstream(format!("Unexpected Porter response: {e}")))
    }
}

#[async_trait]
impl CarrierClient for PorterClient {
    async fn create_order(&self, request: &CreateOrderRequest) -> EngineResult<CreateOrderResponse> {
        tracing::debug!(request_id = %request.request_id, "Creating Porter order");
        self.send(self.http.post(self.url("/v1/orders/create")).json(request))
            .await
    }

    async fn cancel_order(&self, carrier_order_id: &str) -> EngineResult<CancelOrderResponse> {
        let path = format!("/v1/orders/{carrier_order_id}/cancel");
        self.send(self.http.post(self.url(&path))).await
    }

    async fn track_order(&self, carrier_order_id: &str) -> EngineResult<TrackOrderResponse> {
        let path = format!("/v1/orders/{carrier_order_id}");
        self.send(self.http.get(self.url(&path))).await
    }
}
