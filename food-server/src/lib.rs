//! Food Server - 订单生命周期与营业时间服务
//!
//! # 架构概述
//!
//! - **状态机** (`lifecycle`): 订单、退款状态转换，乐观并发写入
//! - **营业时间** (`availability`): 营业时段、商品可售时段判定
//! - **调度器** (`scheduler`): 按营业时间自动开/关店
//! - **配送** (`delivery`): Porter 下单、事件回调、取消后改派
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! food-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── availability/  # 时间窗口判定
//! ├── scheduler/     # 自动营业状态调度
//! ├── lifecycle/     # 订单、退款状态机
//! ├── delivery/      # 配送商客户端、改派
//! ├── db/            # SQLite 连接与 repository
//! ├── cache.rs       # 营业时间缓存
//! └── utils/         # 日志、时间、校验
//! ```

pub mod api;
pub mod availability;
pub mod cache;
pub mod core;
pub mod db;
pub mod delivery;
pub mod lifecycle;
pub mod scheduler;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, EngineError, EngineResult, Server, ServerState};
pub use scheduler::StatusScheduler;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境: 加载 .env，准备工作目录和日志
pub fn setup_environment(config: &Config) -> std::io::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;
    if let Some(dir) = &config.log_dir {
        std::fs::create_dir_all(dir)?;
    }

    init_logger_with_file(
        Some(&config.log_level),
        config.is_production(),
        config.log_dir.as_deref(),
    );
    Ok(())
}
