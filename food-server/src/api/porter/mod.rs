//! Porter API 模块 (配送事件回调、手动改派)

mod handler;

use axum::{Router, routing::post};
use tower::limit::ConcurrencyLimitLayer;

use crate::core::ServerState;

/// 回调并发上限 (配送商重试风暴时保护数据库写入)
const WEBHOOK_CONCURRENCY: usize = 64;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/porter", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/webhook", post(handler::webhook))
        .route("/reassign/{order_id}", post(handler::reassign))
        .layer(ConcurrencyLimitLayer::new(WEBHOOK_CONCURRENCY))
}
