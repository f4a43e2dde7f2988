//! Database connection management

use std::time::{Duration, Instant};

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

use crate::utils::errors::CampHubError;
use crate::utils::logging::log_database_operation;

pub type DatabasePool = Pool<Postgres>;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/camphub".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

impl From<&crate::config::DatabaseConfig> for DatabaseConfig {
    fn from(settings: &crate::config::DatabaseConfig) -> Self {
        Self {
            url: settings.url.clone(),
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
            acquire_timeout: Duration::from_secs(settings.acquire_timeout_seconds),
            ..Self::default()
        }
    }
}

/// Open the pool and make sure the server answers
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, CampHubError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await?;

    health_check(&pool).await?;
    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Apply pending migrations from `migrations/`
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), CampHubError> {
    let started = Instant::now();
    let result = sqlx::migrate!("./migrations").run(pool).await;
    log_database_operation("migrate", "_sqlx_migrations", started.elapsed().as_millis() as u64, result.is_ok());
    result?;

    info!("Database schema is up to date");
    Ok(())
}

pub async fn health_check(pool: &DatabasePool) -> Result<(), CampHubError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_from_settings() {
        let settings = crate::config::DatabaseConfig {
            url: "postgresql://db/camphub".to_string(),
            max_connections: 4,
            min_connections: 2,
            acquire_timeout_seconds: 5,
        };
        let config = DatabaseConfig::from(&settings);
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert!(config.idle_timeout.is_some());
    }
}
