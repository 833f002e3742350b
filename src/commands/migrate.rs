use std::error::Error;
use tracing::{error, info};

use super::connect;

/// Execute the migrate command
pub async fn execute(steps: Option<u32>) -> Result<(), Box<dyn Error>> {
    let (_, pool) = connect().await?;

    match steps {
        Some(n) => info!("Running {} migrations", n),
        None => info!("Running all pending migrations"),
    }

    match pool.migrate_steps(steps).await {
        Ok(()) => {
            info!("Migrations complete");
            Ok(())
        }
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            Err(Box::new(e))
        }
    }
}
