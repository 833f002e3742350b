//! Repository for receipt_txs
//! Payments seen on the payment rail and the refunds issued against them.

use chrono::{Duration, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use tracing::debug;

use crate::domain::models::NewReceipt;
use crate::infrastructure::persistence::entities::{receipt_txs, ReceiptStatus};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::unit_of_work::{with_scope, UnitOfWork};

#[derive(Clone, Debug)]
pub struct RefundRepository {
    conn: DatabaseConnection,
}

impl RefundRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Store a receipt unless its raw id is already known.
    /// Uses ON CONFLICT DO NOTHING; safe to call multiple times.
    /// Returns whether a row was written.
    pub async fn record(&self, receipt: &NewReceipt, status: ReceiptStatus) -> Result<bool, DbError> {
        let now = Utc::now();
        let model = receipt_txs::ActiveModel {
            raw_id: Set(receipt.raw_id),
            ever_hash: Set(receipt.ever_hash.clone()),
            nonce: Set(receipt.nonce),
            symbol: Set(receipt.symbol.clone()),
            token_tag: Set(receipt.token_tag.clone()),
            from_address: Set(receipt.from_address.clone()),
            amount: Set(receipt.amount.clone()),
            data: Set(receipt.data.clone()),
            status: Set(status),
            err_msg: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = receipt_txs::Entity::insert(model)
            .on_conflict(
                OnConflict::column(receipt_txs::Column::RawId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await;

        match result {
            Ok(rows) if rows > 0 => Ok(true),
            Ok(_) | Err(DbErr::RecordNotInserted) => {
                debug!("receipt {} already recorded", receipt.raw_id);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_raw_id(&self, raw_id: i64) -> Result<Option<receipt_txs::Model>, DbError> {
        Ok(receipt_txs::Entity::find_by_id(raw_id).one(&self.conn).await?)
    }

    /// Highest raw id recorded so far, 0 when the feed has not started
    pub async fn high_water_mark(&self) -> Result<i64, DbError> {
        let last = receipt_txs::Entity::find()
            .order_by_desc(receipt_txs::Column::RawId)
            .one(&self.conn)
            .await?;

        Ok(last.map(|r| r.raw_id).unwrap_or(0))
    }

    /// Receipts in `status` created within the last `window_hours`
    pub async fn list_recent_by_status(
        &self,
        status: ReceiptStatus,
        window_hours: i64,
    ) -> Result<Vec<receipt_txs::Model>, DbError> {
        let since = Duration::try_hours(window_hours)
            .and_then(|window| Utc::now().checked_sub_signed(window))
            .ok_or_else(|| {
                DbError::InvalidInput(format!("refund window of {} hours", window_hours))
            })?
            .timestamp_millis();

        let results = receipt_txs::Entity::find()
            .filter(receipt_txs::Column::Status.eq(status))
            .filter(receipt_txs::Column::Nonce.gt(since))
            .order_by_asc(receipt_txs::Column::RawId)
            .all(&self.conn)
            .await?;

        Ok(results)
    }

    /// Move a receipt to `status`, dropping any earlier refund error.
    /// Refund errors are recorded through [`Self::mark_error`] only.
    pub async fn update_status(
        &self,
        raw_id: i64,
        status: ReceiptStatus,
        scope: Option<&UnitOfWork>,
    ) -> Result<u64, DbError> {
        if status == ReceiptStatus::RefundError {
            return Err(DbError::Invariant(format!(
                "receipt {} needs an error message to fail",
                raw_id
            )));
        }

        Ok(with_scope!(&self.conn, scope, |db| {
            Self::write_status(db, raw_id, status).await?
        }))
    }

    async fn write_status<C: ConnectionTrait>(
        db: &C,
        raw_id: i64,
        status: ReceiptStatus,
    ) -> Result<u64, DbError> {
        let result = receipt_txs::Entity::update_many()
            .col_expr(receipt_txs::Column::Status, Expr::value(status))
            .col_expr(receipt_txs::Column::ErrMsg, Expr::value(Option::<String>::None))
            .col_expr(receipt_txs::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(receipt_txs::Column::RawId.eq(raw_id))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Fail the refund attempt for a receipt, keeping the reason.
    /// Resubmission happens upstream under a new raw id.
    pub async fn mark_error(&self, raw_id: i64, message: &str) -> Result<u64, DbError> {
        let result = receipt_txs::Entity::update_many()
            .col_expr(receipt_txs::Column::Status, Expr::value(ReceiptStatus::RefundError))
            .col_expr(receipt_txs::Column::ErrMsg, Expr::value(message))
            .col_expr(receipt_txs::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(receipt_txs::Column::RawId.eq(raw_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}
