//! Payment-side flows: placing orders, confirming payments and expiring
//! overdue ones.

use std::fmt;
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::domain::errors::ServiceError;
use crate::domain::models::NewOrder;
use crate::infrastructure::persistence::entities::{
    orders, receipt_txs, PaymentStatus, ReceiptStatus,
};
use crate::infrastructure::persistence::repositories::{OrderRepository, RefundRepository};
use crate::infrastructure::persistence::{DbPool, UnitOfWork};

#[derive(Clone)]
pub struct PaymentService {
    pool: DbPool,
    order_repository: OrderRepository,
    refund_repository: RefundRepository,
    ledger: LedgerConfig,
}

impl fmt::Debug for PaymentService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentService")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl PaymentService {
    pub fn new(
        pool: DbPool,
        order_repository: OrderRepository,
        refund_repository: RefundRepository,
        ledger: LedgerConfig,
    ) -> Self {
        Self {
            pool,
            order_repository,
            refund_repository,
            ledger,
        }
    }

    /// Receipts waiting for a refund within the configured lookback window
    pub async fn refunds_due(&self) -> Result<Vec<receipt_txs::Model>, ServiceError> {
        Ok(self
            .refund_repository
            .list_recent_by_status(ReceiptStatus::Unrefund, self.ledger.refund_window_hours)
            .await?)
    }

    /// Create an order after the duplicate checks pass.
    ///
    /// The checks are advisory; two callers racing on one item may both pass.
    pub async fn place_order(&self, order: &NewOrder) -> Result<orders::Model, ServiceError> {
        if !self.order_repository.no_paid_order(&order.item_id).await? {
            return Err(ServiceError::Rejected(format!(
                "item {} is already paid for",
                order.item_id
            )));
        }

        if !self
            .order_repository
            .is_latest_unpaid_order(&order.item_id, order.payment_expired_time)
            .await?
        {
            return Err(ServiceError::Rejected(format!(
                "item {} has a newer unpaid order",
                order.item_id
            )));
        }

        Ok(self.order_repository.create(order).await?)
    }

    /// Expire every unpaid order whose deadline is before `now` (epoch
    /// seconds). Returns the number of orders expired by this sweep.
    pub async fn expire_overdue(&self, now: i64) -> Result<u64, ServiceError> {
        let overdue = self.order_repository.sweep_expired(now).await?;

        let mut expired = 0;
        for order in &overdue {
            expired += self.order_repository.mark_expired(order.id).await?;
        }

        if expired > 0 {
            info!("Expired {} overdue orders", expired);
        }
        Ok(expired)
    }

    /// Mark an order paid and, when the payment came from a known receipt,
    /// spend that receipt in the same unit of work.
    ///
    /// Returns false when the order was no longer unpaid.
    pub async fn confirm(
        &self,
        order_id: i64,
        payment_ref: &str,
        receipt_raw_id: Option<i64>,
    ) -> Result<bool, ServiceError> {
        let unit = self.pool.begin().await?;
        match self
            .write_confirmation(&unit, order_id, payment_ref, receipt_raw_id)
            .await
        {
            Ok(true) => {
                unit.commit().await?;
                info!("Order {} paid by {}", order_id, payment_ref);
                Ok(true)
            }
            Ok(false) => {
                unit.abandon().await;
                warn!("Order {} was no longer unpaid", order_id);
                Ok(false)
            }
            Err(e) => {
                unit.abandon().await;
                Err(e)
            }
        }
    }

    async fn write_confirmation(
        &self,
        unit: &UnitOfWork,
        order_id: i64,
        payment_ref: &str,
        receipt_raw_id: Option<i64>,
    ) -> Result<bool, ServiceError> {
        let paid = self
            .order_repository
            .confirm_payment(order_id, payment_ref, PaymentStatus::Paid, Some(unit))
            .await?;
        if !paid {
            return Ok(false);
        }

        if let Some(raw_id) = receipt_raw_id {
            let spent = self
                .refund_repository
                .update_status(raw_id, ReceiptStatus::Spent, Some(unit))
                .await?;
            if spent == 0 {
                return Err(ServiceError::Rejected(format!("unknown receipt {}", raw_id)));
            }
        }

        Ok(true)
    }
}
