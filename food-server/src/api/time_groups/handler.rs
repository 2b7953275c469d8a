//! Time Range Group API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{TimeRangeGroup, TimeRangeGroupCreate, TimeRangeGroupProductAdd, TimeRangeGroupUpdate};

use crate::core::{EngineError, Entity, ServerState};
use crate::db::repository::{RepoError, product, restaurant, time_group};
use crate::utils::validation::{MAX_NAME_LEN, validate_hhmm, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

async fn load(state: &ServerState, id: i64) -> AppResult<TimeRangeGroup> {
    let group = time_group::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| EngineError::not_found(Entity::TimeGroup, id))?;
    Ok(group)
}

/// GET /api/restaurants/:id/time-groups - 获取餐厅的可售时段
pub async fn list_for_restaurant(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
) -> AppResult<Json<Vec<TimeRangeGroup>>> {
    if restaurant::find_by_id(&state.pool, restaurant_id).await?.is_none() {
        return Err(EngineError::not_found(Entity::Restaurant, restaurant_id).into());
    }
    let groups = time_group::find_by_restaurant(&state.pool, restaurant_id).await?;
    Ok(Json(groups))
}

/// POST /api/restaurants/:id/time-groups - 创建可售时段
pub async fn create_for_restaurant(
    State(state): State<ServerState>,
    Path(restaurant_id): Path<i64>,
    Json(payload): Json<TimeRangeGroupCreate>,
) -> AppResult<(StatusCode, Json<TimeRangeGroup>)> {
    validate_required_text(&payload.group_name, "group_name", MAX_NAME_LEN)?;
    validate_hhmm(&payload.start_time, "start_time")?;
    validate_hhmm(&payload.end_time, "end_time")?;
    if restaurant::find_by_id(&state.pool, restaurant_id).await?.is_none() {
        return Err(EngineError::not_found(Entity::Restaurant, restaurant_id).into());
    }

    let group = time_group::create(&state.pool, restaurant_id, payload).await?;
    tracing::info!(group_id = %group.id, restaurant_id = %restaurant_id, "Time group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// PUT /api/time-groups/:id - 部分更新
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TimeRangeGroupUpdate>,
) -> AppResult<Json<TimeRangeGroup>> {
    if let Some(name) = &payload.group_name {
        validate_required_text(name, "group_name", MAX_NAME_LEN)?;
    }
    if let Some(start) = &payload.start_time {
        validate_hhmm(start, "start_time")?;
    }
    if let Some(end) = &payload.end_time {
        validate_hhmm(end, "end_time")?;
    }
    load(&state, id).await?;

    let group = time_group::update(&state.pool, id, payload).await?;
    Ok(Json(group))
}

/// DELETE /api/time-groups/:id - 删除 (关联商品一并移除)
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    load(&state, id).await?;
    time_group::delete(&state.pool, id).await?;
    tracing::info!(group_id = %id, "Time group deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/time-groups/:id/products - 关联商品
pub async fn add_product(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TimeRangeGroupProductAdd>,
) -> AppResult<StatusCode> {
    let group = load(&state, id).await?;
    let item = product::find_by_id(&state.pool, payload.product_id)
        .await?
        .ok_or_else(|| EngineError::not_found(Entity::Product, payload.product_id))?;
    if item.restaurant_id != group.restaurant_id {
        return Err(AppError::validation("Product belongs to a different restaurant")
            .with_detail("product_id", payload.product_id));
    }

    match time_group::add_product(&state.pool, id, payload.product_id).await {
        Ok(()) => Ok(StatusCode::CREATED),
        Err(RepoError::Duplicate(_)) => Err(AppError::new(ErrorCode::AlreadyExists)
            .with_detail("group_id", id)
            .with_detail("product_id", payload.product_id)),
        Err(e) => Err(e.into()),
    }
}

/// DELETE /api/time-groups/:id/products/:product_id - 取消关联
pub async fn remove_product(
    State(state): State<ServerState>,
    Path((id, product_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    load(&state, id).await?;
    time_group::remove_product(&state.pool, id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
