//! Porter API Handlers

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::core::{EngineError, Entity, ServerState};
use crate::delivery::{PORTER_PARTNER, WebhookNotFound, WebhookPayload};
use crate::utils::{AppError, AppResult};

/// POST /api/porter/webhook - 配送事件回调
///
/// 未知的配送单号返回 404 和配送商可读的错误体。
pub async fn webhook(State(state): State<ServerState>, Json(payload): Json<WebhookPayload>) -> Response {
    match state.webhooks.handle(&payload).await {
        Ok(resp) => Json(resp).into_response(),
        Err(EngineError::NotFound {
            entity: Entity::Delivery,
            ..
        }) => {
            tracing::warn!(porter_order_id = %payload.order_id, porter_status = %payload.status, "Webhook for unknown Porter order");
            (StatusCode::NOT_FOUND, Json(WebhookNotFound::new(&payload))).into_response()
        }
        Err(e) => AppError::from(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    #[serde(default = "default_partner")]
    pub partner: String,
}

fn default_partner() -> String {
    PORTER_PARTNER.to_string()
}

#[derive(Debug, Serialize)]
pub struct ReassignResponse {
    pub message: &'static str,
    pub order_id: i64,
    pub porter_order_id: String,
}

/// POST /api/porter/reassign/:order_id - 手动改派 (同步执行)
///
/// 请求体可省略，默认 partner 为 porter。
pub async fn reassign(
    State(state): State<ServerState>,
    Path(order_id): Path<i64>,
    body: Bytes,
) -> AppResult<Json<ReassignResponse>> {
    let partner = if body.iter().all(u8::is_ascii_whitespace) {
        default_partner()
    } else {
        serde_json::from_slice::<ReassignRequest>(&body)
            .map_err(|e| AppError::invalid_request(format!("Invalid reassign body: {e}")))?
            .partner
    };

    let porter_order_id = state.reassigner.reassign(order_id, &partner).await?;
    Ok(Json(ReassignResponse {
        message: "Porter delivery reassigned successfully",
        order_id,
        porter_order_id,
    }))
}
