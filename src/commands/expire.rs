use chrono::Utc;
use std::error::Error;
use tracing::info;

use bundler_ledger::domain::services::PaymentService;
use bundler_ledger::infrastructure::persistence::RepositoryFactory;

use super::connect;

/// Run one expiry sweep
pub async fn execute() -> Result<(), Box<dyn Error>> {
    let (config, pool) = connect().await?;
    let repositories = RepositoryFactory::create_repositories(&pool);
    let service = PaymentService::new(
        pool.clone(),
        repositories.order,
        repositories.refund,
        config.ledger,
    );

    let expired = service.expire_overdue(Utc::now().timestamp()).await?;
    info!("Sweep done, {} orders expired", expired);
    Ok(())
}
