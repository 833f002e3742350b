mod common;

use bundler_ledger::domain::models::{cursor_from_raw, SortDirection};
use bundler_ledger::infrastructure::persistence::entities::{OnChainStatus, PaymentStatus};
use bundler_ledger::infrastructure::persistence::DbError;

use common::{new_order, paid_order, setup};

#[tokio::test]
async fn test_sweep_then_mark_expired_is_idempotent() {
    let (_pool, repos) = setup().await;

    let a = repos.order.create(&new_order("item-a", "k", "s", 100)).await.unwrap();
    let b = repos.order.create(&new_order("item-b", "k", "s", 200)).await.unwrap();
    let c = repos.order.create(&new_order("item-c", "k", "s", 500)).await.unwrap();

    let overdue: Vec<i64> = repos.order.sweep_expired(300).await.unwrap().iter().map(|o| o.id).collect();
    assert_eq!(overdue, vec![a.id, b.id], "only orders past their deadline are swept");

    for id in &overdue {
        assert_eq!(repos.order.mark_expired(*id).await.unwrap(), 1);
    }

    let expired = repos.order.get_by_id(a.id).await.unwrap().unwrap();
    assert_eq!(expired.payment_status, PaymentStatus::Expired);
    assert_eq!(expired.on_chain_status, OnChainStatus::Failed);

    assert!(
        repos.order.sweep_expired(300).await.unwrap().is_empty(),
        "expired orders must leave the sweep set"
    );
    assert_eq!(repos.order.mark_expired(a.id).await.unwrap(), 0, "second expiry is a no-op");

    let live = repos.order.get_by_id(c.id).await.unwrap().unwrap();
    assert_eq!(live.payment_status, PaymentStatus::Unpaid);
}

#[tokio::test]
async fn test_confirm_payment_only_leaves_unpaid_once() {
    let (_pool, repos) = setup().await;
    let order = repos.order.create(&new_order("item-1", "k", "s", 1_000)).await.unwrap();

    let first = repos
        .order
        .confirm_payment(order.id, "pay-1", PaymentStatus::Paid, None)
        .await
        .unwrap();
    let second = repos
        .order
        .confirm_payment(order.id, "pay-2", PaymentStatus::Paid, None)
        .await
        .unwrap();
    assert!(first);
    assert!(!second, "a lost race reports false");

    let stored = repos.order.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(stored.payment_id.as_deref(), Some("pay-1"));

    let result = repos
        .order
        .confirm_payment(order.id, "pay-3", PaymentStatus::Unpaid, None)
        .await;
    assert!(matches!(result, Err(DbError::Invariant(_))));

    let late = repos.order.create(&new_order("item-2", "k", "s", 10)).await.unwrap();
    repos.order.mark_expired(late.id).await.unwrap();
    let paid_late = repos
        .order
        .confirm_payment(late.id, "pay-4", PaymentStatus::Paid, None)
        .await
        .unwrap();
    assert!(!paid_late, "expired orders cannot be paid");
}

#[tokio::test]
async fn test_on_chain_status_moves_only_forward() {
    let (_pool, repos) = setup().await;
    let order = paid_order(&repos, "item-1", false, 10).await;

    assert_eq!(
        repos.order.update_on_chain_status("item-1", OnChainStatus::Success, None).await.unwrap(),
        0,
        "waiting orders cannot skip pending"
    );
    assert_eq!(
        repos.order.update_on_chain_status("item-1", OnChainStatus::Pending, None).await.unwrap(),
        1
    );
    let pending = repos.order.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(pending.on_chain_status, OnChainStatus::Pending);

    assert_eq!(
        repos.order.update_on_chain_status("item-1", OnChainStatus::Success, None).await.unwrap(),
        1
    );
    assert_eq!(
        repos.order.update_on_chain_status("item-1", OnChainStatus::Failed, None).await.unwrap(),
        0,
        "settled orders stay settled"
    );
    let settled = repos.order.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(settled.on_chain_status, OnChainStatus::Success);

    let back = repos
        .order
        .update_on_chain_status("item-1", OnChainStatus::Waiting, None)
        .await;
    assert!(matches!(back, Err(DbError::Invariant(_))));
}

#[tokio::test]
async fn test_unpaid_orders_never_reach_terminal_settlement() {
    let (_pool, repos) = setup().await;
    let unpaid = repos.order.create(&new_order("item-u", "k", "s", i64::MAX)).await.unwrap();
    let paid = paid_order(&repos, "item-p", false, 10).await;
    let expiring = repos.order.create(&new_order("item-e", "k", "s", 5)).await.unwrap();
    repos.order.mark_expired(expiring.id).await.unwrap();

    for item in ["item-u", "item-p"] {
        repos.order.update_on_chain_status(item, OnChainStatus::Pending, None).await.unwrap();
        repos.order.update_on_chain_status(item, OnChainStatus::Success, None).await.unwrap();
    }

    let unpaid = repos.order.get_by_id(unpaid.id).await.unwrap().unwrap();
    assert_eq!(unpaid.on_chain_status, OnChainStatus::Waiting, "unpaid orders are not settled");

    for id in [unpaid.id, paid.id, expiring.id] {
        let order = repos.order.get_by_id(id).await.unwrap().unwrap();
        if order.on_chain_status.is_terminal() {
            assert_ne!(
                order.payment_status,
                PaymentStatus::Unpaid,
                "order {} settled while unpaid",
                order.id
            );
        }
    }
}

#[tokio::test]
async fn test_duplicate_checks_report_safe_to_proceed() {
    let (_pool, repos) = setup().await;
    assert!(repos.order.no_paid_order("item-1").await.unwrap());
    assert!(repos.order.get_open_order("item-1").await.unwrap().is_none());

    repos.order.create(&new_order("item-1", "k", "s", 2_000)).await.unwrap();
    let newest = repos.order.create(&new_order("item-1", "k", "s", 2_500)).await.unwrap();

    assert!(!repos.order.is_latest_unpaid_order("item-1", 1_000).await.unwrap());
    assert!(repos.order.is_latest_unpaid_order("item-1", 3_000).await.unwrap());
    assert_eq!(repos.order.get_open_order("item-1").await.unwrap().unwrap().id, newest.id);

    repos
        .order
        .confirm_payment(newest.id, "pay", PaymentStatus::Paid, None)
        .await
        .unwrap();
    assert!(!repos.order.no_paid_order("item-1").await.unwrap());
}

#[tokio::test]
async fn test_submission_queues_are_drained_separately() {
    let (_pool, repos) = setup().await;
    let sorted_a = paid_order(&repos, "s-1", true, 10).await;
    let sorted_b = paid_order(&repos, "s-2", true, 10).await;
    let direct = paid_order(&repos, "d-1", false, 10).await;
    repos.order.create(&new_order("u-1", "k", "s", i64::MAX)).await.unwrap();

    let sorted: Vec<i64> = repos
        .order
        .select_for_on_chain_submission(true, 2000)
        .await
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(sorted, vec![sorted_a.id, sorted_b.id]);

    let unsorted = repos.order.select_for_on_chain_submission(false, 2000).await.unwrap();
    assert_eq!(unsorted.len(), 1, "unpaid orders are never submitted");
    assert_eq!(unsorted[0].id, direct.id);

    let bounded = repos.order.select_for_on_chain_submission(true, 1).await.unwrap();
    assert_eq!(bounded.len(), 1);

    repos.order.update_on_chain_status("s-1", OnChainStatus::Pending, None).await.unwrap();
    let remaining = repos.order.select_for_on_chain_submission(true, 2000).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, sorted_b.id);

    let processed = repos.order.exists_processed_order("s-1").await.unwrap();
    assert_eq!(processed.map(|o| o.id), Some(sorted_a.id));
    assert!(repos.order.exists_processed_order("s-2").await.unwrap().is_none());
}

#[tokio::test]
async fn test_api_key_pagination_round_trip() {
    let (_pool, repos) = setup().await;
    for i in 1..=10 {
        repos
            .order
            .create(&new_order(&format!("item-{}", i), "key-1", "s", i64::MAX))
            .await
            .unwrap();
    }
    repos.order.create(&new_order("other", "key-2", "s", i64::MAX)).await.unwrap();

    let ids = |page: Vec<bundler_ledger::infrastructure::persistence::entities::orders::Model>| {
        page.into_iter().map(|o| o.id).collect::<Vec<i64>>()
    };

    let first = repos
        .order
        .list_by_api_key("key-1", cursor_from_raw(0), 3, SortDirection::Asc)
        .await
        .unwrap();
    assert_eq!(ids(first), vec![1, 2, 3]);

    let second = repos
        .order
        .list_by_api_key("key-1", Some(3), 3, SortDirection::Asc)
        .await
        .unwrap();
    assert_eq!(ids(second), vec![4, 5, 6]);

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = repos
            .order
            .list_by_api_key("key-1", cursor, 3, SortDirection::Asc)
            .await
            .unwrap();
        if page.is_empty() {
            break;
        }
        cursor = page.last().map(|o| o.id);
        seen.extend(ids(page));
    }
    assert_eq!(seen, (1..=10).collect::<Vec<i64>>(), "every id visited once, in order");

    let newest = repos
        .order
        .list_by_api_key("key-1", cursor_from_raw(0), 3, "desc".parse().unwrap())
        .await
        .unwrap();
    assert_eq!(ids(newest), vec![10, 9, 8]);

    let older = repos
        .order
        .list_by_api_key("key-1", Some(8), 3, SortDirection::Desc)
        .await
        .unwrap();
    assert_eq!(ids(older), vec![7, 6, 5]);
}

#[tokio::test]
async fn test_signer_listing_skips_failed_orders() {
    let (_pool, repos) = setup().await;
    let a = repos.order.create(&new_order("a", "k", "alice", i64::MAX)).await.unwrap();
    let b = repos.order.create(&new_order("b", "k", "alice", 1)).await.unwrap();
    let c = repos.order.create(&new_order("c", "k", "alice", i64::MAX)).await.unwrap();
    repos.order.create(&new_order("d", "k", "bob", i64::MAX)).await.unwrap();
    repos.order.mark_expired(b.id).await.unwrap();

    let page: Vec<i64> = repos
        .order
        .list_by_signer("alice", None, 10)
        .await
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(page, vec![c.id, a.id]);

    let after: Vec<i64> = repos
        .order
        .list_by_signer("alice", Some(c.id), 10)
        .await
        .unwrap()
        .iter()
        .map(|o| o.id)
        .collect();
    assert_eq!(after, vec![a.id]);
}

#[tokio::test]
async fn test_store_rejects_second_settled_order_for_item() {
    let (_pool, repos) = setup().await;
    let first = paid_order(&repos, "dup", false, 10).await;
    let second = paid_order(&repos, "dup", false, 10).await;

    let result = repos
        .order
        .update_on_chain_status("dup", OnChainStatus::Pending, None)
        .await;
    assert!(result.is_err(), "two pending orders for one item must be refused");

    for id in [first.id, second.id] {
        let order = repos.order.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(order.on_chain_status, OnChainStatus::Waiting);
    }
}

#[tokio::test]
async fn test_confirm_payment_cannot_expire_an_order() {
    let (_pool, repos) = setup().await;
    let order = repos.order.create(&new_order("item-x", "k", "s", i64::MAX)).await.unwrap();

    let result = repos
        .order
        .confirm_payment(order.id, "ref", PaymentStatus::Expired, None)
        .await;
    assert!(
        matches!(result, Err(DbError::Invariant(_))),
        "expiry must go through mark_expired"
    );

    let stored = repos.order.get_by_id(order.id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Unpaid);
    assert_eq!(stored.on_chain_status, OnChainStatus::Waiting);
    assert!(stored.payment_id.is_none(), "payment id is only set on paid orders");
}

#[tokio::test]
async fn test_settle_pending_only_moves_pending_orders() {
    let (_pool, repos) = setup().await;
    let waiting = paid_order(&repos, "item-w", false, 10).await;

    assert_eq!(
        repos.order.settle_pending("item-w", OnChainStatus::Failed, None).await.unwrap(),
        0,
        "waiting orders are not settled"
    );
    let order = repos.order.get_by_id(waiting.id).await.unwrap().unwrap();
    assert_eq!(order.on_chain_status, OnChainStatus::Waiting);

    let not_final = repos
        .order
        .settle_pending("item-w", OnChainStatus::Pending, None)
        .await;
    assert!(matches!(not_final, Err(DbError::Invariant(_))));
}
