use std::error::Error;
use tracing::info;

use bundler_ledger::domain::models::statistics::parse_day;
use bundler_ledger::domain::services::StatisticsService;
use bundler_ledger::infrastructure::persistence::RepositoryFactory;

use super::connect;

/// Print the status snapshot as JSON
pub async fn status() -> Result<(), Box<dyn Error>> {
    let (_, pool) = connect().await?;
    let repositories = RepositoryFactory::create_repositories(&pool);

    let payload = repositories.statistics.snapshot_json().await?;
    println!("{}", payload);
    Ok(())
}

/// Roll up one day unless it was already done
pub async fn rollup(date: &str) -> Result<(), Box<dyn Error>> {
    let day = parse_day(date)?;
    let (_, pool) = connect().await?;
    let repositories = RepositoryFactory::create_repositories(&pool);
    let service = StatisticsService::new(repositories.statistics);

    match service.compute_daily_rollup(day).await? {
        Some(totals) => println!("{}", serde_json::to_string(&totals)?),
        None => info!("Nothing to do for {}", date),
    }
    Ok(())
}
