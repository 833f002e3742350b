pub use sea_orm_migration::prelude::*;

mod m20241001_000001_create_orders_table;
mod m20241001_000002_create_on_chain_txs_table;
mod m20241001_000003_create_order_statistics_table;
mod m20241008_000001_create_receipt_txs_table;
mod m20241008_000002_create_token_prices_table;
mod m20241008_000003_create_manifests_table;
mod m20241015_000001_add_settled_item_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241001_000001_create_orders_table::Migration),
            Box::new(m20241001_000002_create_on_chain_txs_table::Migration),
            Box::new(m20241001_000003_create_order_statistics_table::Migration),
            Box::new(m20241008_000001_create_receipt_txs_table::Migration),
            Box::new(m20241008_000002_create_token_prices_table::Migration),
            Box::new(m20241008_000003_create_manifests_table::Migration),
            Box::new(m20241015_000001_add_settled_item_index::Migration),
        ]
    }
}
