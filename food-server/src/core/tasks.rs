//! 后台任务管理
//!
//! 服务级后台任务（历史清理、日程巡检）的注册与关闭。
//! 营业状态调度器自己持有取消令牌，可以在运行时单独启停，不在这里注册。
//!
//! # 任务类型
//!
//! - [`TaskKind::Periodic`] - 定时任务
//! - [`TaskKind::Worker`] - 长期后台工作者

use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// 定时任务
    Periodic,
    /// 长期后台工作者
    Worker,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Periodic => write!(f, "Periodic"),
            TaskKind::Worker => write!(f, "Worker"),
        }
    }
}

struct RegisteredTask {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// 后台任务管理器
///
/// ```ignore
/// let mut tasks = BackgroundTasks::new();
/// let token = tasks.shutdown_token();
/// tasks.spawn("status_maintenance", TaskKind::Periodic, async move {
///     maintenance.run(token).await;
/// });
/// tasks.shutdown().await;
/// ```
pub struct BackgroundTasks {
    tasks: Vec<RegisteredTask>,
    shutdown: CancellationToken,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// 获取取消令牌（任务内部监听 shutdown 信号）
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 注册并启动一个后台任务
    ///
    /// 任务被包装以捕获 panic；任务在 shutdown 之前自行退出会记录告警。
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        let wrapped = async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) => {
                    if !shutdown.is_cancelled() {
                        tracing::warn!(task = %name, kind = %kind, "Background task completed unexpectedly");
                    }
                }
                Err(panic_info) => {
                    let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                        (*s).to_string()
                    } else if let Some(s) = panic_info.downcast_ref::<String>() {
                        s.clone()
                    } else {
                        "Unknown panic".to_string()
                    };
                    tracing::error!(task = %name, kind = %kind, panic = %panic_msg, "Background task panicked");
                }
            }
        };

        let handle = tokio::spawn(wrapped);
        tracing::debug!(task = %name, kind = %kind, "Registered background task");
        self.tasks.push(RegisteredTask { name, kind, handle });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn log_summary(&self) {
        let periodic = self
            .tasks
            .iter()
            .filter(|t| t.kind == TaskKind::Periodic)
            .count();
        tracing::info!(
            "Background tasks registered: {} total (Periodic: {}, Worker: {})",
            self.tasks.len(),
            periodic,
            self.tasks.len() - periodic
        );
    }

    /// Graceful shutdown - 取消所有任务并等待完成
    pub async fn shutdown(self) {
        tracing::info!("Shutting down {} background tasks...", self.tasks.len());
        self.shutdown.cancel();

        for task in self.tasks {
            match task.handle.await {
                Ok(()) => tracing::debug!(task = %task.name, "Task completed"),
                Err(e) if e.is_cancelled() => tracing::debug!(task = %task.name, "Task cancelled"),
                Err(e) => tracing::error!(task = %task.name, error = ?e, "Task join failed"),
            }
        }

        tracing::info!("All background tasks stopped");
    }
}

impl Default for BackgroundTasks {
    fn default() -> Self {
        Self::new()
    }
}
