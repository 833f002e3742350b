//! Repository for on_chain_txs
//! Submission bookkeeping, confirmation and the event-publication flag.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::fmt;

use crate::domain::models::{ChainProof, Submission};
use crate::infrastructure::persistence::entities::{on_chain_txs, TxStatus};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::unit_of_work::{with_scope, UnitOfWork};

/// Repository for ledger-anchoring transactions
#[derive(Clone)]
pub struct OnChainTxRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for OnChainTxRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnChainTxRepository").finish_non_exhaustive()
    }
}

impl OnChainTxRepository {
    /// Create a new OnChainTxRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create a pending transaction for a posted bundle.
    ///
    /// Pair with `OrderRepository::update_on_chain_status` for each item in
    /// the same unit of work so orders and transactions never disagree.
    pub async fn record_submission(
        &self,
        item_ids: &[String],
        submission: &Submission,
        scope: Option<&UnitOfWork>,
    ) -> Result<on_chain_txs::Model, DbError> {
        let model = Self::new_model(item_ids, Some(submission))?;
        Ok(with_scope!(&self.conn, scope, |db| model.insert(db).await?))
    }

    /// Create a placeholder for a bundle that has been assembled but not yet
    /// posted; `update_submission` fills in the chain details later.
    pub async fn insert(&self, item_ids: &[String]) -> Result<on_chain_txs::Model, DbError> {
        let model = Self::new_model(item_ids, None)?;
        Ok(model.insert(&self.conn).await?)
    }

    fn new_model(
        item_ids: &[String],
        submission: Option<&Submission>,
    ) -> Result<on_chain_txs::ActiveModel, DbError> {
        let item_ids = serde_json::to_string(item_ids)
            .map_err(|e| DbError::InvalidInput(format!("item ids: {}", e)))?;
        let now = Utc::now();

        Ok(on_chain_txs::ActiveModel {
            id: sea_orm::NotSet,
            ar_id: Set(submission.map(|s| s.ar_id.clone())),
            item_ids: Set(item_ids),
            cur_height: Set(submission.map(|s| s.cur_height).unwrap_or(0)),
            data_size: Set(submission.map(|s| s.data_size).unwrap_or(0)),
            reward: Set(submission
                .map(|s| s.reward.clone())
                .unwrap_or_else(|| "0".to_string())),
            status: Set(TxStatus::Pending),
            block_id: Set(None),
            block_height: Set(None),
            kafka_published: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    /// Fill the chain details into a placeholder created by `insert`
    pub async fn update_submission(
        &self,
        id: i64,
        submission: &Submission,
        status: TxStatus,
    ) -> Result<u64, DbError> {
        if status == TxStatus::Success {
            return Err(DbError::Invariant(format!(
                "tx {} cannot be submitted as already settled",
                id
            )));
        }

        let result = on_chain_txs::Entity::update_many()
            .col_expr(on_chain_txs::Column::ArId, Expr::value(submission.ar_id.clone()))
            .col_expr(on_chain_txs::Column::CurHeight, Expr::value(submission.cur_height))
            .col_expr(on_chain_txs::Column::DataSize, Expr::value(submission.data_size))
            .col_expr(on_chain_txs::Column::Reward, Expr::value(submission.reward.clone()))
            .col_expr(on_chain_txs::Column::Status, Expr::value(status))
            .col_expr(on_chain_txs::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(on_chain_txs::Column::Id.eq(id))
            .filter(on_chain_txs::Column::Status.eq(TxStatus::Pending))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn get_by_ar_id(&self, ar_id: &str) -> Result<Option<on_chain_txs::Model>, DbError> {
        let result = on_chain_txs::Entity::find()
            .filter(on_chain_txs::Column::ArId.eq(ar_id))
            .one(&self.conn)
            .await?;

        Ok(result)
    }

    /// Transactions in a given status, oldest first
    pub async fn list_by_status(&self, status: TxStatus) -> Result<Vec<on_chain_txs::Model>, DbError> {
        let results = on_chain_txs::Entity::find()
            .filter(on_chain_txs::Column::Status.eq(status))
            .order_by_asc(on_chain_txs::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(results)
    }

    /// Record the chain's verdict on a transaction.
    ///
    /// Block proof is stored exactly when the status is `Success`; a success
    /// without proof, or proof with any other status, is rejected. Only
    /// pending transactions are updated; the count of changed rows is returned.
    pub async fn confirm_or_fail(
        &self,
        ar_id: &str,
        status: TxStatus,
        proof: Option<&ChainProof>,
        scope: Option<&UnitOfWork>,
    ) -> Result<u64, DbError> {
        match (status, proof) {
            (TxStatus::Success, None) => {
                return Err(DbError::Invariant(format!(
                    "tx {} marked success without block proof",
                    ar_id
                )));
            }
            (TxStatus::Pending | TxStatus::Failed, Some(_)) => {
                return Err(DbError::Invariant(format!(
                    "tx {} carries block proof but is not successful",
                    ar_id
                )));
            }
            _ => {}
        }

        Ok(with_scope!(&self.conn, scope, |db| {
            Self::write_verdict(db, ar_id, status, proof).await?
        }))
    }

    async fn write_verdict<C: ConnectionTrait>(
        db: &C,
        ar_id: &str,
        status: TxStatus,
        proof: Option<&ChainProof>,
    ) -> Result<u64, DbError> {
        let mut update = on_chain_txs::Entity::update_many()
            .col_expr(on_chain_txs::Column::Status, Expr::value(status))
            .col_expr(on_chain_txs::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(proof) = proof {
            update = update
                .col_expr(on_chain_txs::Column::BlockId, Expr::value(proof.block_id.clone()))
                .col_expr(on_chain_txs::Column::BlockHeight, Expr::value(proof.block_height));
        }

        let result = update
            .filter(on_chain_txs::Column::ArId.eq(ar_id))
            .filter(on_chain_txs::Column::Status.eq(TxStatus::Pending))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Settled transactions above the cutover height not yet sent downstream
    pub async fn select_for_event_publication(
        &self,
        cutover_height: i64,
        limit: u64,
    ) -> Result<Vec<on_chain_txs::Model>, DbError> {
        let results = on_chain_txs::Entity::find()
            .filter(on_chain_txs::Column::BlockHeight.gt(cutover_height))
            .filter(on_chain_txs::Column::KafkaPublished.eq(false))
            .filter(on_chain_txs::Column::Status.eq(TxStatus::Success))
            .order_by_asc(on_chain_txs::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(results)
    }

    /// Flag a transaction as published. Repeating it changes nothing.
    pub async fn mark_published(&self, id: i64) -> Result<(), DbError> {
        on_chain_txs::Entity::update_many()
            .col_expr(on_chain_txs::Column::KafkaPublished, Expr::value(true))
            .filter(on_chain_txs::Column::Id.eq(id))
            .filter(on_chain_txs::Column::KafkaPublished.eq(false))
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
