//! PostgreSQL-backed repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::{GoalProgress, Repository, StoreError, StoreResult};
use crate::models::*;

sql_repository!(PgRepository, sqlx::PgPool);

impl PgRepository {
    /// Connects and applies `migrations/postgres`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        sqlx::migrate!("migrations/postgres").run(&pool).await?;
        Ok(Self::new(pool))
    }
}
