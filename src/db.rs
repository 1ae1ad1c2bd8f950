use std::sync::Arc;

use anyhow::bail;

use crate::repository::{PgRepository, Repository, SqliteRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

/// Picks the storage backend from the URL scheme.
pub fn backend_for(database_url: &str) -> Option<Backend> {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Some(Backend::Postgres)
    } else if database_url.starts_with("sqlite:") {
        Some(Backend::Sqlite)
    } else {
        None
    }
}

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Arc<dyn Repository>> {
    let repo: Arc<dyn Repository> = match backend_for(database_url) {
        Some(Backend::Postgres) => {
            Arc::new(PgRepository::connect(database_url, max_connections).await?)
        }
        Some(Backend::Sqlite) if database_url == "sqlite::memory:" => {
            tracing::warn!("using a private in-memory SQLite database; data is lost on exit");
            Arc::new(SqliteRepository::in_memory().await?)
        }
        Some(Backend::Sqlite) => {
            Arc::new(SqliteRepository::connect(database_url, max_connections).await?)
        }
        None => bail!("unsupported DATABASE_URL scheme (expected postgres:// or sqlite:)"),
    };
    Ok(repo)
}
