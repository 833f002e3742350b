mod common;

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Mutex;

use bundler_ledger::config::LedgerConfig;
use bundler_ledger::domain::errors::{PublishError, ServiceError};
use bundler_ledger::domain::models::{ChainProof, NewReceipt, SettlementOutcome};
use bundler_ledger::domain::services::{
    EventPublisher, PaymentService, SettlementService, StatisticsService,
};
use bundler_ledger::infrastructure::persistence::entities::{
    on_chain_txs, OnChainStatus, PaymentStatus, ReceiptStatus, TxStatus,
};
use bundler_ledger::infrastructure::persistence::{DbPool, Repositories};

use common::{items, new_order, paid_order, setup, submission};

fn settlement_with(pool: &DbPool, repos: &Repositories, ledger: LedgerConfig) -> SettlementService {
    SettlementService::new(
        pool.clone(),
        repos.order.clone(),
        repos.on_chain_tx.clone(),
        ledger,
    )
}

fn settlement(pool: &DbPool, repos: &Repositories) -> SettlementService {
    settlement_with(pool, repos, LedgerConfig::default())
}

fn payments(pool: &DbPool, repos: &Repositories) -> PaymentService {
    PaymentService::new(
        pool.clone(),
        repos.order.clone(),
        repos.refund.clone(),
        LedgerConfig::default(),
    )
}

fn receipt(raw_id: i64, nonce: i64, item_id: &str) -> NewReceipt {
    NewReceipt {
        raw_id,
        ever_hash: format!("0xhash{}", raw_id),
        nonce,
        symbol: "AR".to_string(),
        token_tag: "arweave,ethereum-ar-AR".to_string(),
        from_address: "0xpayer".to_string(),
        amount: "100".to_string(),
        data: item_id.to_string(),
    }
}

/// Records what it publishes and fails for chosen tx ids
struct RecordingPublisher {
    fail_ids: HashSet<i64>,
    published: Mutex<Vec<i64>>,
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    fn publisher_name(&self) -> String {
        "recording".to_string()
    }

    async fn publish(&self, tx: &on_chain_txs::Model) -> Result<(), PublishError> {
        if self.fail_ids.contains(&tx.id) {
            return Err(PublishError(format!("broker refused {}", tx.id)));
        }
        self.published.lock().unwrap().push(tx.id);
        Ok(())
    }
}

#[tokio::test]
async fn test_submit_and_confirm_settles_every_item() {
    let (pool, repos) = setup().await;
    let service = settlement(&pool, &repos);
    let a = paid_order(&repos, "a", true, 10).await;
    let b = paid_order(&repos, "b", true, 20).await;

    let tx = service.submit(&items(&["a", "b"]), &submission("ar-1")).await.unwrap();
    assert_eq!(tx.status, TxStatus::Pending);
    for id in [a.id, b.id] {
        let order = repos.order.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(order.on_chain_status, OnChainStatus::Pending);
    }

    let resubmit = service.submit(&items(&["a"]), &submission("ar-2")).await;
    assert!(matches!(resubmit, Err(ServiceError::Rejected(_))), "items are submitted once");

    let outcome = SettlementOutcome::Confirmed(ChainProof {
        block_id: "block-x".to_string(),
        block_height: 1_300_000,
    });
    assert_eq!(service.settle("ar-1", &outcome).await.unwrap(), 2);

    let tx = repos.on_chain_tx.get_by_ar_id("ar-1").await.unwrap().unwrap();
    assert_eq!(tx.status, TxStatus::Success);
    assert_eq!(tx.block_height, Some(1_300_000));
    for id in [a.id, b.id] {
        let order = repos.order.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(order.on_chain_status, OnChainStatus::Success);
    }

    let twice = service.settle("ar-1", &SettlementOutcome::Failed).await;
    assert!(matches!(twice, Err(ServiceError::Rejected(_))));
}

#[tokio::test]
async fn test_failed_submission_leaves_nothing_behind() {
    let (pool, repos) = setup().await;
    let service = settlement(&pool, &repos);
    let paid = paid_order(&repos, "paid", false, 10).await;
    repos.order.create(&new_order("unpaid", "k", "s", i64::MAX)).await.unwrap();

    let result = service
        .submit(&items(&["paid", "unpaid"]), &submission("ar-partial"))
        .await;
    assert!(matches!(result, Err(ServiceError::Rejected(_))));

    assert!(
        repos.on_chain_tx.get_by_ar_id("ar-partial").await.unwrap().is_none(),
        "the transaction row is rolled back"
    );
    let order = repos.order.get_by_id(paid.id).await.unwrap().unwrap();
    assert_eq!(order.on_chain_status, OnChainStatus::Waiting, "the order flip is rolled back");
}

#[tokio::test]
async fn test_chain_failure_fails_anchored_orders() {
    let (pool, repos) = setup().await;
    let service = settlement(&pool, &repos);
    let order = paid_order(&repos, "f", false, 10).await;
    service.submit(&items(&["f"]), &submission("ar-f")).await.unwrap();

    assert_eq!(service.settle("ar-f", &SettlementOutcome::Failed).await.unwrap(), 1);

    let tx = repos.on_chain_tx.get_by_ar_id("ar-f").await.unwrap().unwrap();
    assert_eq!(tx.status, TxStatus::Failed);
    assert!(tx.block_id.is_none());
    let order = repos.order.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(order.on_chain_status, OnChainStatus::Failed);

    let unknown = service.settle("ar-missing", &SettlementOutcome::Failed).await;
    assert!(matches!(unknown, Err(ServiceError::Rejected(_))));
}

#[tokio::test]
async fn test_publish_batch_retries_failed_publishes() {
    let (pool, repos) = setup().await;
    let service = settlement(&pool, &repos);
    let cutover = 1_188_855;

    let mut ids = Vec::new();
    for item in ["p-1", "p-2", "p-3"] {
        paid_order(&repos, item, false, 10).await;
        let ar_id = format!("ar-{}", item);
        let tx = service.submit(&items(&[item]), &submission(&ar_id)).await.unwrap();
        let proof = ChainProof {
            block_id: format!("block-{}", item),
            block_height: cutover + 10,
        };
        service
            .settle(&ar_id, &SettlementOutcome::Confirmed(proof))
            .await
            .unwrap();
        ids.push(tx.id);
    }

    let flaky = RecordingPublisher {
        fail_ids: HashSet::from([ids[1]]),
        published: Mutex::new(Vec::new()),
    };
    assert_eq!(service.publish_batch(&flaky).await.unwrap(), 2);
    assert_eq!(*flaky.published.lock().unwrap(), vec![ids[0], ids[2]]);

    let healthy = RecordingPublisher {
        fail_ids: HashSet::new(),
        published: Mutex::new(Vec::new()),
    };
    assert_eq!(service.publish_batch(&healthy).await.unwrap(), 1);
    assert_eq!(*healthy.published.lock().unwrap(), vec![ids[1]]);
    assert_eq!(service.publish_batch(&healthy).await.unwrap(), 0);
}

#[tokio::test]
async fn test_payment_spends_receipt_atomically() {
    let (pool, repos) = setup().await;
    let service = payments(&pool, &repos);

    let order = service
        .place_order(&new_order("item-1", "k", "s", i64::MAX))
        .await
        .unwrap();
    repos
        .refund
        .record(&receipt(42, Utc::now().timestamp_millis(), "item-1"), ReceiptStatus::Unspent)
        .await
        .unwrap();

    let unknown = service.confirm(order.id, "0xabc", Some(404)).await;
    assert!(matches!(unknown, Err(ServiceError::Rejected(_))));
    let still_unpaid = repos.order.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(
        still_unpaid.payment_status,
        PaymentStatus::Unpaid,
        "payment is rolled back with the receipt"
    );

    assert!(service.confirm(order.id, "0xabc", Some(42)).await.unwrap());
    let paid = repos.order.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    let spent = repos.refund.get_by_raw_id(42).await.unwrap().unwrap();
    assert_eq!(spent.status, ReceiptStatus::Spent);

    assert!(!service.confirm(order.id, "0xdef", None).await.unwrap(), "paid once");

    let duplicate = service.place_order(&new_order("item-1", "k", "s", i64::MAX)).await;
    assert!(matches!(duplicate, Err(ServiceError::Rejected(_))));
}

#[tokio::test]
async fn test_place_order_refuses_to_shadow_newer_unpaid_order() {
    let (pool, repos) = setup().await;
    let service = payments(&pool, &repos);

    service.place_order(&new_order("item", "k", "s", 5_000)).await.unwrap();
    let older = service.place_order(&new_order("item", "k", "s", 4_000)).await;
    assert!(matches!(older, Err(ServiceError::Rejected(_))));
    service.place_order(&new_order("item", "k", "s", 6_000)).await.unwrap();
}

#[tokio::test]
async fn test_expire_overdue_counts_each_order_once() {
    let (pool, repos) = setup().await;
    let service = payments(&pool, &repos);
    let now = Utc::now().timestamp();

    repos.order.create(&new_order("late-1", "k", "s", now - 60)).await.unwrap();
    repos.order.create(&new_order("late-2", "k", "s", now - 30)).await.unwrap();
    repos.order.create(&new_order("on-time", "k", "s", now + 3600)).await.unwrap();

    assert_eq!(service.expire_overdue(now).await.unwrap(), 2);
    assert_eq!(service.expire_overdue(now).await.unwrap(), 0);
}

#[tokio::test]
async fn test_daily_rollup_is_computed_once() {
    let (pool, repos) = setup().await;
    let service = settlement(&pool, &repos);
    paid_order(&repos, "s-1", false, 700).await;
    service.submit(&items(&["s-1"]), &submission("ar-s")).await.unwrap();
    let proof = ChainProof {
        block_id: "b".to_string(),
        block_height: 2_000_000,
    };
    service.settle("ar-s", &SettlementOutcome::Confirmed(proof)).await.unwrap();

    let stats = StatisticsService::new(repos.statistics.clone());
    let today = Utc::now().date_naive();

    let totals = stats.compute_daily_rollup(today).await.unwrap().expect("first run computes");
    assert_eq!((totals.totals, totals.total_data_size), (1, 700));
    assert!(stats.compute_daily_rollup(today).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_transaction_leaves_waiting_orders_alone() {
    let (pool, repos) = setup().await;
    let service = settlement(&pool, &repos);
    let anchored = paid_order(&repos, "shared", false, 10).await;
    service.submit(&items(&["shared"]), &submission("ar-shared")).await.unwrap();
    let newer = paid_order(&repos, "shared", false, 10).await;

    assert_eq!(service.settle("ar-shared", &SettlementOutcome::Failed).await.unwrap(), 1);

    let anchored = repos.order.get_by_id(anchored.id).await.unwrap().unwrap();
    assert_eq!(anchored.on_chain_status, OnChainStatus::Failed);
    let newer = repos.order.get_by_id(newer.id).await.unwrap().unwrap();
    assert_eq!(
        newer.on_chain_status,
        OnChainStatus::Waiting,
        "orders outside the transaction keep waiting"
    );
}

#[tokio::test]
async fn test_ledger_config_bounds_batches() {
    let (pool, repos) = setup().await;
    let ledger = LedgerConfig {
        submission_batch_limit: 1,
        publish_cutover_height: 2_000_000,
        publish_batch_limit: 1,
        refund_window_hours: 24,
    };
    let service = settlement_with(&pool, &repos, ledger);

    let first = paid_order(&repos, "q-1", true, 10).await;
    paid_order(&repos, "q-2", true, 10).await;
    let batch = service.next_batch(true).await.unwrap();
    assert_eq!(batch.len(), 1, "submission batch follows the configured size");
    assert_eq!(batch[0].id, first.id);
    assert!(service.next_batch(false).await.unwrap().is_empty());

    for (item, height) in [("q-1", 1_500_000), ("q-2", 2_000_001)] {
        let ar_id = format!("ar-{}", item);
        service.submit(&items(&[item]), &submission(&ar_id)).await.unwrap();
        let proof = ChainProof {
            block_id: format!("block-{}", item),
            block_height: height,
        };
        service.settle(&ar_id, &SettlementOutcome::Confirmed(proof)).await.unwrap();
    }

    let publisher = RecordingPublisher {
        fail_ids: HashSet::new(),
        published: Mutex::new(Vec::new()),
    };
    assert_eq!(service.publish_batch(&publisher).await.unwrap(), 1);
    assert_eq!(
        service.publish_batch(&publisher).await.unwrap(),
        0,
        "transactions at or below the configured cutover are never published"
    );
}

#[tokio::test]
async fn test_refunds_due_use_configured_window() {
    let (pool, repos) = setup().await;
    let service = payments(&pool, &repos);
    let now = Utc::now();

    let fresh = (now - chrono::Duration::hours(2)).timestamp_millis();
    let stale = (now - chrono::Duration::hours(30)).timestamp_millis();
    repos.refund.record(&receipt(1, stale, "a"), ReceiptStatus::Unrefund).await.unwrap();
    repos.refund.record(&receipt(2, fresh, "b"), ReceiptStatus::Unrefund).await.unwrap();
    repos.refund.record(&receipt(3, fresh, "c"), ReceiptStatus::Spent).await.unwrap();

    let due: Vec<i64> = service.refunds_due().await.unwrap().iter().map(|r| r.raw_id).collect();
    assert_eq!(due, vec![2]);
}
