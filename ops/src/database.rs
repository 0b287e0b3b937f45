use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::OpsResult;

/// Database pool configuration
///
/// The provisioning commands run a few statements and exit, so the pool is
/// deliberately small.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 2,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(max) = std::env::var("DB_MAX_CONNECTIONS") {
            if let Ok(n) = max.parse() {
                config.max_connections = n;
            }
        }

        if let Ok(timeout) = std::env::var("DB_ACQUIRE_TIMEOUT") {
            if let Ok(n) = timeout.parse() {
                config.acquire_timeout = Duration::from_secs(n);
            }
        }

        config
    }
}

/// Connect to the clinic database described by `db`.
pub async fn create_pool(db: &DatabaseConfig) -> OpsResult<PgPool> {
    let mut config = PoolConfig::from_env();
    config.acquire_timeout = config.acquire_timeout.min(db.connect_timeout);
    create_pool_with_config(db, config).await
}

pub async fn create_pool_with_config(db: &DatabaseConfig, config: PoolConfig) -> OpsResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect_with(db.connect_options()?)
        .await?;

    tracing::debug!(
        target_db = %db.display_target(),
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        "database pool created"
    );

    Ok(pool)
}
