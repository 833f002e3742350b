//! Submission, confirmation and publication flows for ledger-anchoring
//! transactions. Every flow that touches orders and transactions together
//! runs in one unit of work.

use std::fmt;
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::domain::errors::ServiceError;
use crate::domain::models::{SettlementOutcome, Submission};
use crate::domain::services::event_publisher::EventPublisher;
use crate::infrastructure::persistence::entities::{on_chain_txs, orders, OnChainStatus, TxStatus};
use crate::infrastructure::persistence::repositories::{OnChainTxRepository, OrderRepository};
use crate::infrastructure::persistence::{DbPool, UnitOfWork};

#[derive(Clone)]
pub struct SettlementService {
    pool: DbPool,
    order_repository: OrderRepository,
    tx_repository: OnChainTxRepository,
    ledger: LedgerConfig,
}

impl fmt::Debug for SettlementService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettlementService")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl SettlementService {
    pub fn new(
        pool: DbPool,
        order_repository: OrderRepository,
        tx_repository: OnChainTxRepository,
        ledger: LedgerConfig,
    ) -> Self {
        Self {
            pool,
            order_repository,
            tx_repository,
            ledger,
        }
    }

    /// Next paid orders waiting in the sorted or the direct queue, bounded
    /// by the configured submission batch size
    pub async fn next_batch(&self, sorted: bool) -> Result<Vec<orders::Model>, ServiceError> {
        Ok(self
            .order_repository
            .select_for_on_chain_submission(sorted, self.ledger.submission_batch_limit)
            .await?)
    }

    /// Record a posted bundle and move its orders from waiting to pending.
    ///
    /// Refuses when any item already has a pending or settled order.
    pub async fn submit(
        &self,
        item_ids: &[String],
        submission: &Submission,
    ) -> Result<on_chain_txs::Model, ServiceError> {
        if item_ids.is_empty() {
            return Err(ServiceError::Rejected("submission without items".into()));
        }

        for item_id in item_ids {
            if let Some(order) = self.order_repository.exists_processed_order(item_id).await? {
                return Err(ServiceError::Rejected(format!(
                    "item {} already processed by order {}",
                    item_id, order.id
                )));
            }
        }

        let unit = self.pool.begin().await?;
        match self.write_submission(&unit, item_ids, submission).await {
            Ok(tx) => {
                unit.commit().await?;
                info!(
                    "Recorded submission {} anchoring {} items",
                    submission.ar_id,
                    item_ids.len()
                );
                Ok(tx)
            }
            Err(e) => {
                unit.abandon().await;
                Err(e)
            }
        }
    }

    async fn write_submission(
        &self,
        unit: &UnitOfWork,
        item_ids: &[String],
        submission: &Submission,
    ) -> Result<on_chain_txs::Model, ServiceError> {
        let tx = self
            .tx_repository
            .record_submission(item_ids, submission, Some(unit))
            .await?;

        for item_id in item_ids {
            let moved = self
                .order_repository
                .update_on_chain_status(item_id, OnChainStatus::Pending, Some(unit))
                .await?;
            if moved == 0 {
                return Err(ServiceError::Rejected(format!(
                    "item {} has no paid order waiting for submission",
                    item_id
                )));
            }
        }

        Ok(tx)
    }

    /// Apply the chain's verdict to a pending transaction and to every order
    /// it anchors. Returns the number of orders moved.
    pub async fn settle(&self, ar_id: &str, outcome: &SettlementOutcome) -> Result<u64, ServiceError> {
        let tx = self
            .tx_repository
            .get_by_ar_id(ar_id)
            .await?
            .ok_or_else(|| ServiceError::Rejected(format!("unknown transaction {}", ar_id)))?;

        if tx.status != TxStatus::Pending {
            return Err(ServiceError::Rejected(format!(
                "transaction {} already settled",
                ar_id
            )));
        }

        let item_ids = tx.item_ids();
        let unit = self.pool.begin().await?;
        match self.write_verdict(&unit, ar_id, outcome, &item_ids).await {
            Ok(moved) => {
                unit.commit().await?;
                info!(
                    "Settled {} as {:?}, {} orders moved",
                    ar_id,
                    outcome.tx_status(),
                    moved
                );
                Ok(moved)
            }
            Err(e) => {
                unit.abandon().await;
                Err(e)
            }
        }
    }

    async fn write_verdict(
        &self,
        unit: &UnitOfWork,
        ar_id: &str,
        outcome: &SettlementOutcome,
        item_ids: &[String],
    ) -> Result<u64, ServiceError> {
        let status = outcome.tx_status();
        let updated = self
            .tx_repository
            .confirm_or_fail(ar_id, status, outcome.proof(), Some(unit))
            .await?;
        if updated == 0 {
            return Err(ServiceError::Rejected(format!(
                "transaction {} is no longer pending",
                ar_id
            )));
        }

        let mut moved = 0;
        for item_id in item_ids {
            moved += self
                .order_repository
                .settle_pending(item_id, status.order_status(), Some(unit))
                .await?;
        }

        Ok(moved)
    }

    /// Publish one batch of settled transactions above the configured
    /// cutover height.
    ///
    /// A transaction is flagged only after its publish succeeded, so a failed
    /// one comes back in the next batch. Returns the number published.
    pub async fn publish_batch(&self, publisher: &dyn EventPublisher) -> Result<usize, ServiceError> {
        let batch = self
            .tx_repository
            .select_for_event_publication(
                self.ledger.publish_cutover_height,
                self.ledger.publish_batch_limit,
            )
            .await?;

        let mut published = 0;
        for tx in &batch {
            match publisher.publish(tx).await {
                Ok(()) => {
                    self.tx_repository.mark_published(tx.id).await?;
                    published += 1;
                }
                Err(e) => {
                    warn!(
                        "{} failed to publish tx {}: {}",
                        publisher.publisher_name(),
                        tx.id,
                        e
                    );
                }
            }
        }

        debug!("Published {}/{} settled transactions", published, batch.len());
        Ok(published)
    }
}
