use chrono_tz::Tz;

/// 服务器配置 - 订单与营业状态服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖（`.env` 由 dotenv 预先加载）：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | DATABASE_URL | sqlite://{WORK_DIR}/food.db | 数据库连接 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (无) | 设置后按天滚动写日志文件 |
/// | DEFAULT_TIMEZONE | Asia/Kolkata | 餐厅时区缺省值 |
/// | PORTER_BASE_URL | https://pfe-apigw-uat.porter.in | 配送商 API |
/// | PORTER_API_KEY | (空) | 配送商 API Key |
/// | CARRIER_TIMEOUT_MS | 30000 | 配送商请求超时(毫秒) |
/// | AUTO_STATUS_ON_START | true | 启动时开启自动营业状态管理 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/food HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// sqlx 连接串
    pub database_url: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// 餐厅未配置或配置了无效时区时使用
    pub timezone: Tz,
    /// Porter API 根地址
    pub porter_base_url: String,
    pub porter_api_key: String,
    /// 配送商请求超时 (毫秒)
    pub carrier_timeout_ms: u64,
    /// 启动时是否自动开启营业状态调度
    pub auto_status_on_start: bool,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite://{}/food.db", work_dir));

        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            timezone: std::env::var("DEFAULT_TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::Asia::Kolkata),
            porter_base_url: std::env::var("PORTER_BASE_URL")
                .unwrap_or_else(|_| "https://pfe-apigw-uat.porter.in".into()),
            porter_api_key: std::env::var("PORTER_API_KEY").unwrap_or_default(),
            carrier_timeout_ms: std::env::var("CARRIER_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            auto_status_on_start: std::env::var("AUTO_STATUS_ON_START")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            work_dir,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(
        work_dir: impl Into<String>,
        database_url: impl Into<String>,
        http_port: u16,
    ) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_url = database_url.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
