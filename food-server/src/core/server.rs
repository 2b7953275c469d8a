//! Server Implementation
//!
//! HTTP 服务器启动和管理

use crate::api;
use crate::core::{BackgroundTasks, Config, ServerState, TaskKind};
use crate::scheduler::StatusMaintenance;
use crate::utils::AppError;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<(), AppError> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        if self.config.auto_status_on_start {
            state.scheduler.start()?;
        }

        let mut tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();
        let maintenance = StatusMaintenance::new(state.store.clone());
        tasks.spawn("status_maintenance", TaskKind::Periodic, async move {
            maintenance.run(token).await;
        });
        tasks.log_summary();

        let app = api::build_router(state.clone());
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        tracing::info!("Food server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AppError::internal(format!("HTTP server error: {e}")));

        state.scheduler.stop();
        tasks.shutdown().await;
        state.pool.close().await;

        served
    }
}
