#![allow(dead_code)]

use bundler_ledger::config::DatabaseConfig;
use bundler_ledger::domain::models::{NewOrder, Submission};
use bundler_ledger::infrastructure::persistence::entities::{orders, PaymentStatus};
use bundler_ledger::infrastructure::persistence::{DbPool, Repositories, RepositoryFactory};

/// Fresh in-memory ledger migrated with the production migrator.
///
/// One connection only: every in-memory SQLite connection is its own
/// database, and the pool must stay free while a unit of work is open.
pub async fn setup() -> (DbPool, Repositories) {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout_secs: 5,
        acquire_timeout_secs: 5,
        idle_timeout_secs: 300,
    };

    let pool = DbPool::new(&config)
        .await
        .expect("Failed to open in-memory database");
    pool.migrate().await.expect("Failed to run migrations");

    let repositories = RepositoryFactory::create_repositories(&pool);
    (pool, repositories)
}

pub fn new_order(item_id: &str, api_key: &str, signer: &str, expires_at: i64) -> NewOrder {
    NewOrder {
        item_id: item_id.to_string(),
        api_key: api_key.to_string(),
        signer: signer.to_string(),
        payment_expired_time: expires_at,
        sort: false,
        size: 100,
    }
}

/// Create an order and pay for it
pub async fn paid_order(repos: &Repositories, item_id: &str, sort: bool, size: i64) -> orders::Model {
    let mut order = new_order(item_id, "key", "signer", i64::MAX);
    order.sort = sort;
    order.size = size;

    let created = repos.order.create(&order).await.expect("create order");
    let paid = repos
        .order
        .confirm_payment(created.id, &format!("pay-{}", item_id), PaymentStatus::Paid, None)
        .await
        .expect("confirm payment");
    assert!(paid, "fresh order should accept payment");

    repos
        .order
        .get_by_id(created.id)
        .await
        .expect("load order")
        .expect("order exists")
}

pub fn submission(ar_id: &str) -> Submission {
    Submission {
        ar_id: ar_id.to_string(),
        cur_height: 1_200_000,
        data_size: 4096,
        reward: "1500000".to_string(),
    }
}

pub fn items(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}
