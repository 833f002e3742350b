use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::unit_of_work::UnitOfWork;

/// Manages database connection pool
#[derive(Clone)]
pub struct DbPool {
    connection: DatabaseConnection,
}

impl DbPool {
    /// Creates a new database connection pool
    pub async fn new(config: &DatabaseConfig) -> Result<Self, DbError> {
        info!("Connecting to database");

        let conn_opts = ConnectOptions::new(config.url.clone())
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(false)
            .to_owned();

        match Database::connect(conn_opts).await {
            Ok(connection) => {
                info!("Database connection established successfully");
                Ok(DbPool { connection })
            }
            Err(e) => {
                error!("Failed to connect to database: {}", e);
                Err(DbError::ConnectionError(format!(
                    "Failed to connect to database: {}",
                    e
                )))
            }
        }
    }

    /// Creates or updates every ledger table. Safe to run on each startup.
    pub async fn migrate(&self) -> Result<(), DbError> {
        self.migrate_steps(None).await
    }

    /// Applies at most `steps` pending migrations (all when `None`)
    pub async fn migrate_steps(&self, steps: Option<u32>) -> Result<(), DbError> {
        let pending = Migrator::get_pending_migrations(&self.connection).await?;
        info!("{} pending migrations", pending.len());

        Migrator::up(&self.connection, steps).await?;
        Ok(())
    }

    /// Begins a unit of work on this pool
    pub async fn begin(&self) -> Result<UnitOfWork, DbError> {
        UnitOfWork::begin(&self.connection).await
    }

    /// Returns the database connection
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}
