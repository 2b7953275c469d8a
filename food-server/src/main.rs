use food_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载 .env 和配置
    let _ = dotenv::dotenv();
    let config = Config::from_env();

    // 2. 工作目录、日志
    setup_environment(&config)?;
    tracing::info!(
        "Food server starting (env: {}, default timezone: {})",
        config.environment,
        config.timezone.name()
    );

    // 3. 初始化服务器状态
    let state = ServerState::initialize(&config).await?;

    // 4. 启动 HTTP 服务器 (Server::run 会启动调度器和后台任务)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
