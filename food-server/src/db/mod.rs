//! Database Module
//!
//! Handles SQLite connection pool and migrations

pub mod repository;

use crate::utils::AppError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

/// Database service — owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database at `url` with WAL mode and apply migrations
    pub async fn new(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::database(format!("Invalid database url: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            // busy_timeout: 写冲突时等待 5s 而非立即失败
            .busy_timeout(Duration::from_secs(5))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory database with migrations applied
    ///
    /// Single connection: every pooled connection to `sqlite::memory:` would
    /// otherwise see its own empty database.
    pub async fn memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(format!("Invalid database url: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .set_ignore_missing(true)
            .run(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Liveness check used by the health endpoint
    pub async fn ping(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        Ok(())
    }
}
