pub mod expire;
pub mod migrate;
pub mod report;

use std::error::Error;
use tracing::info;

use bundler_ledger::config::AppConfig;
use bundler_ledger::infrastructure::persistence::DbPool;

/// Load configuration from the environment and open the pool
pub async fn connect() -> Result<(AppConfig, DbPool), Box<dyn Error>> {
    let config = AppConfig::from_env();
    info!("Using database pool of {}", config.database.max_connections);

    let pool = DbPool::new(&config.database).await?;
    Ok((config, pool))
}
