//! Restaurant API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use shared::models::{
    ProductAvailability, ProductsByTime, Restaurant, RestaurantStatusChange, RestaurantStatusUpdate,
    RestaurantStatusView, RestaurantTimeStatus, RestaurantTiming, RestaurantTimingUpdate,
};

use crate::availability::{
    is_product_available_at, product_time_infos, restaurant_time_status, restaurant_tz, should_be_open,
};
use crate::cache::{TIME_STATUS_TTL, TIMING_TTL, time_status_key, timing_key};
use crate::core::{EngineError, Entity, ServerState};
use crate::db::repository::{product, restaurant, time_group};
use crate::utils::AppResult;
use crate::utils::types::PaginationParams;
use crate::utils::time::{local_day_and_hhmm, parse_request_instant};
use crate::utils::validation::validate_schedule;

const MANUAL_REASON: &str = "Manual status update";
const MANUAL_ACTOR: &str = "manual";

async fn load(state: &ServerState, id: i64) -> AppResult<Restaurant> {
    let found = restaurant::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| EngineError::not_found(Entity::Restaurant, id))?;
    Ok(found)
}

/// GET /api/restaurants/:id/timing - 获取营业时间配置
pub async fn get_timing(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RestaurantTiming>> {
    let key = timing_key(id);
    if let Some(cached) = state.cache.get::<RestaurantTiming>(&key) {
        return Ok(Json(cached));
    }

    let timing = RestaurantTiming::from(&load(&state, id).await?);
    state.cache.set(key, &timing, TIMING_TTL);
    Ok(Json(timing))
}

/// PUT /api/restaurants/:id/timing - 更新营业时间配置
pub async fn update_timing(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RestaurantTimingUpdate>,
) -> AppResult<Json<RestaurantTiming>> {
    validate_schedule(&payload.opening_hours)?;
    load(&state, id).await?;

    let updated =
        restaurant::update_timing(&state.pool, id, &payload.opening_hours, payload.auto_open_close).await?;
    state.cache.invalidate_restaurant(id);

    tracing::info!(restaurant_id = %id, auto_open_close = updated.auto_open_close, "Restaurant timing updated");
    Ok(Json(RestaurantTiming::from(&updated)))
}

/// PUT /api/restaurants/:id/status - 手动开/关店
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RestaurantStatusUpdate>,
) -> AppResult<Json<RestaurantStatusView>> {
    let current = load(&state, id).await?;
    let change =
        restaurant::set_open_status(&state.pool, id, payload.is_open, MANUAL_REASON, MANUAL_ACTOR).await?;
    state.cache.invalidate_restaurant(id);

    if change.is_some() {
        tracing::info!(restaurant_id = %id, is_open = payload.is_open, "Restaurant status set manually");
    }

    Ok(Json(RestaurantStatusView {
        restaurant_id: id,
        is_open: payload.is_open,
        auto_open_close: current.auto_open_close,
        changed: change.is_some(),
        last_status_update: change
            .as_ref()
            .map(|c| c.created_at)
            .or(current.last_status_update),
    }))
}

/// GET /api/restaurants/:id/time-status - 当前营业状态 (含下次开门时间)
pub async fn get_time_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RestaurantTimeStatus>> {
    let key = time_status_key(id);
    if let Some(cached) = state.cache.get::<RestaurantTimeStatus>(&key) {
        return Ok(Json(cached));
    }

    let found = load(&state, id).await?;
    let tz = restaurant_tz(&found, state.config.timezone);
    let status = restaurant_time_status(&found, tz, Utc::now());
    state.cache.set(key, &status, TIME_STATUS_TTL);
    Ok(Json(status))
}

/// POST /api/restaurants/:id/force-status-update - 立即按营业时间重新评估
pub async fn force_status_update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RestaurantStatusView>> {
    let view = state.scheduler.force_status_update(id, Utc::now()).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub days: Option<i64>,
}

/// GET /api/restaurants/:id/status-history - 营业状态变更历史
pub async fn status_history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<RestaurantStatusChange>>> {
    let history = state.scheduler.status_history(id, query.days, Utc::now()).await?;
    Ok(Json(history))
}

/// Evaluation instant; all absent means now
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// GET /api/restaurants/:id/products/:product_id/availability - 商品可售检查
pub async fn product_availability(
    State(state): State<ServerState>,
    Path((id, product_id)): Path<(i64, i64)>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<ProductAvailability>> {
    let found = load(&state, id).await?;
    let item = product::find_by_id(&state.pool, product_id)
        .await?
        .filter(|p| p.restaurant_id == id)
        .ok_or_else(|| EngineError::not_found(Entity::Product, product_id))?;

    let tz = restaurant_tz(&found, state.config.timezone);
    let instant = parse_request_instant(
        query.date_time.as_deref(),
        query.date.as_deref(),
        query.time.as_deref(),
        tz,
        Utc::now(),
    )?;

    let groups = time_group::find_by_product(&state.pool, product_id).await?;
    let (_, hhmm) = local_day_and_hhmm(instant, tz);
    let verdict = is_product_available_at(item.is_available, &groups, should_be_open(&found, tz, instant), &hhmm);

    Ok(Json(ProductAvailability {
        product_id,
        is_available: verdict.available,
        reason: verdict.reason.map(str::to_string),
        next_available: verdict.next_available,
        time_groups: groups,
        evaluated_at: instant.with_timezone(&tz).to_rfc3339(),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductsByTimeQuery {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ProductsByTimeQuery {
    fn pagination(&self) -> PaginationParams {
        let defaults = PaginationParams::default();
        PaginationParams {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
    }
}

/// GET /api/restaurants/:id/products/by-time - 餐厅全部商品在指定时间点的可售状态
pub async fn products_by_time(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<ProductsByTimeQuery>,
) -> AppResult<Json<ProductsByTime>> {
    let found = load(&state, id).await?;
    let tz = restaurant_tz(&found, state.config.timezone);
    let instant = parse_request_instant(
        query.date_time.as_deref(),
        query.date.as_deref(),
        query.time.as_deref(),
        tz,
        Utc::now(),
    )?;
    let pagination = query.pagination();

    let total_count = product::count_by_restaurant(&state.pool, id).await?;
    let products =
        product::page_by_restaurant(&state.pool, id, pagination.limit(), pagination.offset()).await?;
    let groups = time_group::find_by_restaurant(&state.pool, id).await?;
    let memberships = time_group::memberships_by_restaurant(&state.pool, id).await?;

    let restaurant_status = restaurant_time_status(&found, tz, instant);
    let (_, hhmm) = local_day_and_hhmm(instant, tz);
    let products = product_time_infos(products, &groups, &memberships, restaurant_status.is_open, &hhmm);

    Ok(Json(ProductsByTime {
        products,
        total_count,
        page: pagination.page.max(1),
        page_size: pagination.limit() as u32,
        requested_time: hhmm,
        evaluated_at: instant.with_timezone(&tz).to_rfc3339(),
        time_groups: groups,
        restaurant_status,
    }))
}
