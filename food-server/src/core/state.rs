use std::sync::Arc;

use sqlx::SqlitePool;

use crate::cache::TimingCache;
use crate::core::Config;
use crate::db::DbService;
use crate::delivery::{CarrierClient, PorterClient, PorterDispatcher, Reassigner, WebhookService};
use crate::lifecycle::{OrderLifecycle, RefundService};
use crate::scheduler::{RestaurantStore, SqliteRestaurantStore, StatusScheduler};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是 `Arc` 或内部持有连接池，`clone()` 是浅拷贝。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | pool | SQLite 连接池 |
/// | cache | 营业时间/状态缓存 |
/// | store | 调度器使用的餐厅存储 |
/// | scheduler | 自动营业状态调度器 |
/// | orders / refunds | 订单、退款状态机 |
/// | reassigner / webhooks | 配送改派与事件同步 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub cache: Arc<TimingCache>,
    pub store: Arc<dyn RestaurantStore>,
    pub scheduler: Arc<StatusScheduler>,
    pub orders: OrderLifecycle,
    pub refunds: RefundService,
    pub reassigner: Arc<Reassigner>,
    pub webhooks: WebhookService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 数据库 (连接 + 迁移)
    /// 3. Porter 客户端和各业务服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!("Failed to create work dir {}: {e}", config.work_dir))
        })?;

        let db = DbService::new(&config.database_url).await?;
        let carrier = PorterClient::from_config(config).map_err(AppError::from)?;

        Ok(Self::from_parts(config.clone(), db.pool, Arc::new(carrier)))
    }

    /// 用现成的连接池和配送商客户端组装 (测试注入假实现)
    pub fn from_parts(config: Config, pool: SqlitePool, carrier: Arc<dyn CarrierClient>) -> Self {
        let cache = Arc::new(TimingCache::new());
        let store: Arc<dyn RestaurantStore> = Arc::new(SqliteRestaurantStore::new(pool.clone()));
        let scheduler = Arc::new(StatusScheduler::new(store.clone(), cache.clone(), config.timezone));

        let orders = OrderLifecycle::new(pool.clone());
        let refunds = RefundService::new(pool.clone());

        let dispatch = Arc::new(PorterDispatcher::new(pool.clone(), carrier.clone()));
        let reassigner = Arc::new(Reassigner::new(pool.clone(), dispatch, carrier));
        let webhooks = WebhookService::new(pool.clone(), orders.clone(), reassigner.clone());

        Self {
            config,
            pool,
            cache,
            store,
            scheduler,
            orders,
            refunds,
            reassigner,
            webhooks,
        }
    }
}
