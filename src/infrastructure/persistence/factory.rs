use sea_orm::DatabaseConnection;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::repositories::{
    ManifestRepository, OnChainTxRepository, OrderRepository, PriceRepository, RefundRepository,
    Repositories, StatisticsRepository,
};

/// Factory for creating repositories
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create all repositories sharing the pool's connection
    pub fn create_repositories(db_pool: &DbPool) -> Repositories {
        let conn = db_pool.get_connection().clone();

        Repositories::new(
            Self::create_order_repository(conn.clone()),
            Self::create_on_chain_tx_repository(conn.clone()),
            Self::create_refund_repository(conn.clone()),
            Self::create_price_repository(conn.clone()),
            Self::create_manifest_repository(conn.clone()),
            Self::create_statistics_repository(conn),
        )
    }

    pub fn create_order_repository(conn: DatabaseConnection) -> OrderRepository {
        OrderRepository::new(conn)
    }

    pub fn create_on_chain_tx_repository(conn: DatabaseConnection) -> OnChainTxRepository {
        OnChainTxRepository::new(conn)
    }

    pub fn create_refund_repository(conn: DatabaseConnection) -> RefundRepository {
        RefundRepository::new(conn)
    }

    pub fn create_price_repository(conn: DatabaseConnection) -> PriceRepository {
        PriceRepository::new(conn)
    }

    pub fn create_manifest_repository(conn: DatabaseConnection) -> ManifestRepository {
        ManifestRepository::new(conn)
    }

    pub fn create_statistics_repository(conn: DatabaseConnection) -> StatisticsRepository {
        StatisticsRepository::new(conn)
    }
}
