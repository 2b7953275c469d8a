//! System API - 自动营业状态调度开关
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/system/automatic-status | GET | 调度器是否运行 |
//! | /api/system/automatic-status/start | POST | 启动 (已运行返回 409) |
//! | /api/system/automatic-status/stop | POST | 停止 (幂等) |

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/system", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/automatic-status", get(get_status))
        .route("/automatic-status/start", post(start))
        .route("/automatic-status/stop", post(stop))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub running: bool,
}

/// GET /api/system/automatic-status - 调度器状态
pub async fn get_status(State(state): State<ServerState>) -> Json<SchedulerStatus> {
    Json(SchedulerStatus {
        running: state.scheduler.is_running(),
    })
}

/// POST /api/system/automatic-status/start - 启动自动营业状态管理
pub async fn start(State(state): State<ServerState>) -> AppResult<Json<SchedulerStatus>> {
    state.scheduler.start()?;
    Ok(Json(SchedulerStatus { running: true }))
}

/// POST /api/system/automatic-status/stop - 停止自动营业状态管理
pub async fn stop(State(state): State<ServerState>) -> Json<SchedulerStatus> {
    state.scheduler.stop();
    Json(SchedulerStatus { running: false })
}
