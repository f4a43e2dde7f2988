//! CampHub maintenance process
//!
//! Connects, migrates, promotes the configured bootstrap admins and then
//! clears expired account tokens on a fixed interval until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};

use camphub::{
    config::Settings,
    database::{create_pool, run_migrations, DatabaseConfig, DatabaseService},
    services::{LogMailer, ServiceFactory},
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate().context("invalid configuration")?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}", camphub::info());

    info!("Connecting to database...");
    let pool = create_pool(&DatabaseConfig::from(&settings.database))
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool).await?;

    let services = ServiceFactory::new(&settings, DatabaseService::new(pool), Arc::new(LogMailer))?;

    let health = services.health_check().await;
    for issue in health.get_issues() {
        warn!(issue = %issue, "Startup health check");
    }

    let promoted = services.admin_service.bootstrap_admins().await?;
    info!(promoted = promoted, "Bootstrap admins processed");

    let mut interval = tokio::time::interval(Duration::from_secs(settings.maintenance.cleanup_interval_seconds));
    info!(
        interval_seconds = settings.maintenance.cleanup_interval_seconds,
        "Maintenance loop running"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match services.admin_service.cleanup_expired_tokens().await {
                    Ok(cleared) => info!(cleared = cleared, "Token cleanup finished"),
                    Err(e) => error!(error = %e, severity = %e.severity(), "Token cleanup failed"),
                }
                let tracked = services.rate_limiter.cleanup();
                info!(tracked_keys = tracked, "Rate limiter buckets pruned");
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl-C")?;
                info!("Shutdown requested");
                break;
            }
        }
    }

    info!("CampHub maintenance process stopped");
    Ok(())
}
