use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseConfig, StoreBackend};

use super::memory::MemoryStore;
use super::postgres::PgStore;
use super::store::{Store, StoreError};

/// Builds the store handle the router is given at startup
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect the configured backend, running migrations when enabled
    pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn Store>, StoreError> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store; data is lost on restart");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreBackend::Postgres => {
                let pool = Self::connect(config).await?;
                if config.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    /// Create a PostgreSQL pool from `DATABASE_URL`
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for: {}", Self::redacted_url(url)?);
        Ok(pool)
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Connection string with the password removed, safe for logs
    fn redacted_url(database_url: &str) -> Result<String, StoreError> {
        let mut url = url::Url::parse(database_url).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***"))
                .map_err(|_| StoreError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
