//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::models::{Order, OrderCreate, OrderDetail, OrderStatusUpdate};

use crate::core::ServerState;
use crate::utils::AppResult;

/// Status update response with the customer-facing message
#[derive(Debug, Serialize)]
pub struct OrderStatusResponse {
    #[serde(flatten)]
    pub order: Order,
    pub status_message: &'static str,
}

/// POST /api/orders - 下单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.orders.create(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/:id - 订单详情 (含状态日志)
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.get(id).await?;
    Ok(Json(detail))
}

/// PUT /api/orders/:id/status - 更新订单状态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<OrderStatusResponse>> {
    let order = state
        .orders
        .update_status(id, payload.status, payload.note.as_deref())
        .await?;
    Ok(Json(OrderStatusResponse {
        status_message: order.order_status.status_message(),
        order,
    }))
}
