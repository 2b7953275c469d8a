//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`restaurants`] - 营业时间、营业状态、商品可售
//! - [`time_groups`] - 商品可售时段
//! - [`system`] - 自动营业状态调度开关
//! - [`orders`] - 订单状态机
//! - [`refunds`] - 退款状态机
//! - [`porter`] - 配送回调与改派

pub mod health;
pub mod orders;
pub mod porter;
pub mod refunds;
pub mod restaurants;
pub mod system;
pub mod time_groups;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&shared::util::snowflake_id().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, no middleware
pub fn routes() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(restaurants::router())
        .merge(time_groups::router())
        .merge(system::router())
        .merge(orders::router())
        .merge(refunds::router())
        .merge(porter::router())
}

/// Fully configured application used by the HTTP server and tests
pub fn build_router(state: ServerState) -> Router {
    routes()
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use http::{Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use shared::models::{PorterDeliveryCreate, WeeklySchedule};
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    use super::*;
    use crate::core::Config;
    use crate::db::repository::{delivery, fixtures};
    use crate::delivery::fakes::FakeCarrier;

    async fn app() -> (Router, SqlitePool, ServerState) {
        let pool = fixtures::pool().await;
        let config = Config::with_overrides("./target/test-data", "sqlite::memory:", 0);
        let state = ServerState::from_parts(config, pool.clone(), Arc::new(FakeCarrier::default()));
        (build_router(state.clone()), pool, state)
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_and_scheduler_switch() {
        let (app, _, state) = app().await;

        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "ok");
        assert_eq!(body["scheduler_running"], false);

        let (status, _) = call(&app, Method::POST, "/api/system/automatic-status/start", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = call(&app, Method::POST, "/api/system/automatic-status/start", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 9101);

        let (_, body) = call(&app, Method::GET, "/api/system/automatic-status", None).await;
        assert_eq!(body["running"], true);
        for _ in 0..2 {
            let (status, _) = call(&app, Method::POST, "/api/system/automatic-status/stop", None).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert!(!state.scheduler.is_running());
    }

    #[tokio::test]
    async fn test_timing_update_validates_and_clears_cache() {
        let (app, pool, state) = app().await;
        let r = fixtures::restaurant(&pool, "A", fixtures::every_day("09:00", "17:00")).await;
        let uri = format!("/api/restaurants/{}/timing", r.id);

        let (status, body) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["opening_hours"]["monday"]["open_time"], "09:00");
        assert!(!state.cache.is_empty());

        let bad = json!({
            "opening_hours": {"monday": {"is_open": true, "open_time": "9:00", "close_time": "17:00"}},
            "auto_open_close": true
        });
        let (status, body) = call(&app, Method::PUT, &uri, Some(bad)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 6002);

        let good = json!({
            "opening_hours": {"monday": {"is_open": true, "open_time": "22:00", "close_time": "04:00"}},
            "auto_open_close": false
        });
        let (status, body) = call(&app, Method::PUT, &uri, Some(good)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["auto_open_close"], false);
        assert!(state.cache.is_empty());

        let (_, body) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(body["opening_hours"]["monday"]["close_time"], "04:00");
        assert!(body["opening_hours"].get("tuesday").is_none());
    }

    #[tokio::test]
    async fn test_manual_status_is_recorded_once() {
        let (app, pool, _) = app().await;
        let r = fixtures::restaurant(&pool, "A", WeeklySchedule::default()).await;
        let uri = format!("/api/restaurants/{}/status", r.id);

        let (status, body) = call(&app, Method::PUT, &uri, Some(json!({"is_open": true}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["changed"], true);
        let (_, body) = call(&app, Method::PUT, &uri, Some(json!({"is_open": true}))).await;
        assert_eq!(body["changed"], false);

        let (_, history) = call(&app, Method::GET, &format!("/api/restaurants/{}/status-history", r.id), None).await;
        let history = history.as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["updated_by"], "manual");

        let (status, body) = call(&app, Method::GET, "/api/restaurants/1/time-status", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 6001);
    }

    #[tokio::test]
    async fn test_product_availability_with_groups() {
        let (app, pool, _) = app().await;
        let r = fixtures::restaurant(&pool, "A", fixtures::every_day("00:00", "23:59")).await;
        let p = fixtures::product(&pool, r.id, "Dosa").await;

        let (status, group) = call(
            &app,
            Method::POST,
            &format!("/api/restaurants/{}/time-groups", r.id),
            Some(json!({"group_name": "Breakfast", "start_time": "07:00", "end_time": "11:00"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let group_id = group["id"].as_i64().unwrap();

        let (status, _) = call(
            &app,
            Method::POST,
            &format!("/api/time-groups/{group_id}/products"),
            Some(json!({"product_id": p.id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let base = format!("/api/restaurants/{}/products/{}/availability", r.id, p.id);
        let (status, body) = call(&app, Method::GET, &format!("{base}?date=2024-01-01&time=08:30"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_available"], true);
        assert_eq!(body["time_groups"].as_array().unwrap().len(), 1);

        let (_, body) = call(&app, Method::GET, &format!("{base}?date=2024-01-01&time=15:00"), None).await;
        assert_eq!(body["is_available"], false);
        assert_eq!(body["reason"], "Product not available at this time");
        assert_eq!(body["next_available"], "07:00");

        let (status, _) = call(&app, Method::GET, &format!("{base}?time=25:00"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(&app, Method::DELETE, &format!("/api/time-groups/{group_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = call(&app, Method::GET, &format!("{base}?date=2024-01-01&time=15:00"), None).await;
        assert_eq!(body["is_available"], true);
    }

    #[tokio::test]
    async fn test_products_by_time_lists_whole_menu() {
        let (app, pool, _) = app().await;
        let r = fixtures::restaurant(&pool, "A", fixtures::every_day("09:00", "17:00")).await;
        let dosa = fixtures::product(&pool, r.id, "Dosa").await;
        let thali = fixtures::product(&pool, r.id, "Thali").await;

        let (_, group) = call(
            &app,
            Method::POST,
            &format!("/api/restaurants/{}/time-groups", r.id),
            Some(json!({"group_name": "Breakfast", "start_time": "07:00", "end_time": "11:00"})),
        )
        .await;
        call(
            &app,
            Method::POST,
            &format!("/api/time-groups/{}/products", group["id"]),
            Some(json!({"product_id": dosa.id})),
        )
        .await;

        let base = format!("/api/restaurants/{}/products/by-time", r.id);
        let (status, body) = call(&app, Method::GET, &format!("{base}?date=2024-01-01&time=15:00"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 2);
        assert_eq!(body["requested_time"], "15:00");
        assert_eq!(body["restaurant_status"]["is_open"], true);
        assert_eq!(body["time_groups"].as_array().unwrap().len(), 1);

        let products = body["products"].as_array().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0]["product"]["id"], dosa.id);
        assert_eq!(products[0]["is_available"], false);
        assert_eq!(products[0]["next_available"], "07:00");
        assert_eq!(products[0]["time_groups"].as_array().unwrap().len(), 1);
        assert_eq!(products[1]["product"]["id"], thali.id);
        assert_eq!(products[1]["is_available"], true);
        assert!(products[1]["time_groups"].as_array().unwrap().is_empty());

        let (_, body) = call(&app, Method::GET, &format!("{base}?date=2024-01-01&time=10:00"), None).await;
        assert_eq!(body["products"][0]["is_available"], true);

        // Closed: everything blocked, next opening reported
        let (_, body) = call(&app, Method::GET, &format!("{base}?date=2024-01-01&time=20:00"), None).await;
        assert_eq!(body["restaurant_status"]["is_open"], false);
        assert!(body["restaurant_status"]["next_open_time"].is_string());
        for p in body["products"].as_array().unwrap() {
            assert_eq!(p["reason"], "Restaurant is closed");
        }

        let (_, body) = call(&app, Method::GET, &format!("{base}?time=10:00&page=2&page_size=1"), None).await;
        assert_eq!(body["total_count"], 2);
        assert_eq!(body["page"], 2);
        assert_eq!(body["products"].as_array().unwrap().len(), 1);
        assert_eq!(body["products"][0]["product"]["id"], thali.id);

        let (status, _) = call(&app, Method::GET, &format!("{base}?time=9am"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, Method::GET, "/api/restaurants/1/products/by-time", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_order_status_endpoint() {
        let (app, pool, _) = app().await;
        let r = fixtures::restaurant(&pool, "A", WeeklySchedule::default()).await;
        let (status, order) = call(
            &app,
            Method::POST,
            "/api/orders",
            Some(json!({
                "user_id": 1, "restaurant_id": r.id, "cart_id": 1, "total_amount": 250.0,
                "customer_name": "Asha", "customer_contact": "9000000000", "delivery_address": "MG Road"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("/api/orders/{}/status", order["id"]);

        let (status, body) = call(&app, Method::PUT, &uri, Some(json!({"status": "confirmed"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order_status"], "confirmed");
        assert_eq!(body["status_message"], "Your order has been confirmed by the restaurant");

        let (status, body) = call(&app, Method::PUT, &uri, Some(json!({"status": "delivered"}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 4002);

        let (_, detail) = call(&app, Method::GET, &format!("/api/orders/{}", order["id"]), None).await;
        assert_eq!(detail["order_logs"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_porter_webhook_unknown_order() {
        let (app, _, _) = app().await;
        let (status, body) = call(
            &app,
            Method::POST,
            "/api/porter/webhook",
            Some(json!({"status": "order_cancel", "order_id": "CRN-404", "order_details": {"event_ts": 0}})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["porter_order_id"], "CRN-404");
        assert_eq!(body["status"], "order_cancel");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_porter_webhook_requires_order_id_and_status() {
        let (app, _, _) = app().await;
        for payload in [
            json!({"status": "order_accepted", "order_id": ""}),
            json!({"order_id": "CRN-1"}),
        ] {
            let (status, body) = call(&app, Method::POST, "/api/porter/webhook", Some(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["code"], 2);
            assert_eq!(body["message"], "Order ID and status are required");
        }
    }

    #[tokio::test]
    async fn test_manual_reassign() {
        let (app, pool, _) = app().await;
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

        let uri = format!("/api/porter/reassign/{}", order.id);
        let (status, body) = call(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let new_id = body["porter_order_id"].as_str().unwrap().to_string();
        assert_ne!(new_id, "CRN-OLD");

        let active = delivery::find_active_by_order(&pool, order.id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].porter_order_id, new_id);

        let (status, _) = call(&app, Method::POST, &uri, Some(json!({"partner": "dunzo"}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
