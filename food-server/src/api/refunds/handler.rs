//! Refund API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::models::{Refund, RefundCreate, RefundStatus, RefundStatusUpdate};

use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::types::{Page, PaginationParams};

/// Query params for listing refunds
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<RefundStatus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListQuery {
    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
    }
}

/// POST /api/refunds - 申请退款
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RefundCreate>,
) -> AppResult<(StatusCode, Json<Refund>)> {
    let refund = state.refunds.create(payload).await?;
    Ok((StatusCode::CREATED, Json(refund)))
}

/// GET /api/refunds - 按状态分页查询
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<Refund>>> {
    let page = state.refunds.list_by_status(query.status, &query.pagination()).await?;
    Ok(Json(page))
}

/// GET /api/refunds/:id - 获取退款
pub async fn get_by_id(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Refund>> {
    Ok(Json(state.refunds.get(id).await?))
}

/// PUT /api/refunds/:id/status - 审批/驳回/标记失败
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RefundStatusUpdate>,
) -> AppResult<Json<Refund>> {
    Ok(Json(state.refunds.update_status(id, payload.status).await?))
}

/// POST /api/refunds/:id/process - 打款 (仅 approved)
pub async fn process(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<Json<Refund>> {
    Ok(Json(state.refunds.process(id).await?))
}
