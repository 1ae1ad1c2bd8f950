//! SQLite-backed repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use uuid::Uuid;

use super::{GoalProgress, Repository, StoreError, StoreResult};
use crate::models::*;

sql_repository!(SqliteRepository, sqlx::SqlitePool);

impl SqliteRepository {
    /// Connects (creating the file if needed) and applies `migrations/sqlite`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        Self::open(SqlitePoolOptions::new().max_connections(max_connections), options).await
    }

    /// Private in-memory database. Each connection to `sqlite::memory:` sees
    /// its own database, so the pool holds exactly one connection and never
    /// closes it.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool_options = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
        Self::open(pool_options, SqliteConnectOptions::from_str("sqlite::memory:")?).await
    }

    async fn open(
        pool_options: SqlitePoolOptions,
        options: SqliteConnectOptions,
    ) -> Result<Self, StoreError> {
        let pool = pool_options.connect_with(options.foreign_keys(true)).await?;
        sqlx::migrate!("migrations/sqlite").run(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_keeps_its_only_connection() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let options = repo.pool().options();
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 1);
        assert_eq!(options.get_idle_timeout(), None);
        assert_eq!(options.get_max_lifetime(), None);
    }

    #[tokio::test]
    async fn in_memory_database_is_migrated() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        assert_eq!(repo.count_patients().await.unwrap(), 0);
        assert!(repo.list_goals().await.unwrap().is_empty());
    }
}
