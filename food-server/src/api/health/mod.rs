//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 存活检查 + 数据库连通性 + 调度器状态 |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "database": "ok",
//!   "scheduler_running": true
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::DbService;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// 状态 (ok | degraded)
    status: &'static str,
    version: &'static str,
    /// 数据库检查 (ok | error)
    database: &'static str,
    scheduler_running: bool,
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database = match DbService::ping(&state.pool).await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::error!(error = %e, "Health check database ping failed");
            "error"
        }
    };

    Json(HealthResponse {
        status: if database == "ok" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        scheduler_running: state.scheduler.is_running(),
    })
}
