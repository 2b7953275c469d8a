//! Restaurant API 模块 (营业时间、营业状态、商品可售)
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /{id}/timing | GET/PUT | 营业时间配置 |
//! | /{id}/status | PUT | 手动开/关店 |
//! | /{id}/time-status | GET | 当前营业状态 |
//! | /{id}/force-status-update | POST | 立即重新评估 |
//! | /{id}/status-history | GET | 状态变更历史 (最多 30 天) |
//! | /{id}/products/by-time | GET | 全部商品在某时间点的可售状态 |
//! | /{id}/products/{product_id}/availability | GET | 单个商品可售检查 |
//! | /{id}/time-groups | GET/POST | 时段分组 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/restaurants", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/{id}/timing", get(handler::get_timing).put(handler::update_timing))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/time-status", get(handler::get_time_status))
        .route("/{id}/force-status-update", post(handler::force_status_update))
        .route("/{id}/status-history", get(handler::status_history))
        .route("/{id}/products/by-time", get(handler::products_by_time))
        .route(
            "/{id}/products/{product_id}/availability",
            get(handler::product_availability),
        )
        .route(
            "/{id}/time-groups",
            get(crate::api::time_groups::list_for_restaurant)
                .post(crate::api::time_groups::create_for_restaurant),
        )
}
