//! Restaurant persistence seam used by the scheduler

use async_trait::async_trait;
use shared::models::{Restaurant, RestaurantStatusChange};
use sqlx::SqlitePool;

use crate::db::repository::restaurant::{self, ScannedRestaurant};
use crate::db::repository::RepoResult;

#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn count_auto_managed(&self) -> RepoResult<i64>;

    /// Auto-managed active restaurants, ordered by id; undecodable rows stay in their slot
    async fn page_auto_managed(&self, limit: i64, offset: i64) -> RepoResult<Vec<ScannedRestaurant>>;

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Restaurant>>;

    /// See [`restaurant::set_open_status`]
    async fn set_open_status(
        &self,
        id: i64,
        is_open: bool,
        reason: &str,
        updated_by: &str,
    ) -> RepoResult<Option<RestaurantStatusChange>>;

    async fn status_history(
        &self,
        restaurant_id: i64,
        since_millis: i64,
    ) -> RepoResult<Vec<RestaurantStatusChange>>;

    async fn prune_history(&self, before_millis: i64) -> RepoResult<u64>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteRestaurantStore {
    pool: SqlitePool,
}

impl SqliteRestaurantStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RestaurantStore for SqliteRestaurantStore {
    async fn count_auto_managed(&self) -> RepoResult<i64> {
        restaurant::count_auto_managed(&self.pool).await
    }

    async fn page_auto_managed(&self, limit: i64, offset: i64) -> RepoResult<Vec<ScannedRestaurant>> {
        restaurant::page_auto_managed(&self.pool, limit, offset).await
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Restaurant>> {
        restaurant::find_by_id(&self.pool, id).await
    }

    async fn set_open_status(
        &self,
        id: i64,
        is_open: bool,
        reason: &str,
        updated_by: &str,
    ) -> RepoResult<Option<RestaurantStatusChange>> {
        restaurant::set_open_status(&self.pool, id, is_open, reason, updated_by).await
    }

    async fn status_history(
        &self,
        restaurant_id: i64,
        since_millis: i64,
    ) -> RepoResult<Vec<RestaurantStatusChange>> {
        restaurant::status_history(&self.pool, restaurant_id, since_millis).await
    }

    async fn prune_history(&self, before_millis: i64) -> RepoResult<u64> {
        restaurant::prune_history(&self.pool, before_millis).await
    }
}
