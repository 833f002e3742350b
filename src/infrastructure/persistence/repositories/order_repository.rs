//! Repository for orders
//! Owns the payment and settlement transitions of an order.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use std::fmt;

use crate::domain::models::{NewOrder, SortDirection};
use crate::infrastructure::persistence::entities::{orders, OnChainStatus, PaymentStatus};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::unit_of_work::{with_scope, UnitOfWork};

/// Repository for order operations
#[derive(Clone)]
pub struct OrderRepository {
    conn: DatabaseConnection,
}

impl fmt::Debug for OrderRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderRepository").finish_non_exhaustive()
    }
}

impl OrderRepository {
    /// Create a new OrderRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new unpaid order.
    ///
    /// Callers are expected to have checked [`Self::no_paid_order`] and
    /// [`Self::is_latest_unpaid_order`] first; neither check is repeated here.
    pub async fn create(&self, order: &NewOrder) -> Result<orders::Model, DbError> {
        let now = Utc::now();
        let model = orders::ActiveModel {
            id: sea_orm::NotSet,
            item_id: Set(order.item_id.clone()),
            api_key: Set(order.api_key.clone()),
            signer: Set(order.signer.clone()),
            payment_status: Set(PaymentStatus::Unpaid),
            payment_id: Set(None),
            payment_expired_time: Set(order.payment_expired_time),
            on_chain_status: Set(OnChainStatus::Waiting),
            sort: Set(order.sort),
            size: Set(order.size),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(model.insert(&self.conn).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<orders::Model>, DbError> {
        Ok(orders::Entity::find_by_id(id).one(&self.conn).await?)
    }

    /// Most recent unpaid order for an item
    pub async fn get_open_order(&self, item_id: &str) -> Result<Option<orders::Model>, DbError> {
        let result = orders::Entity::find()
            .filter(orders::Column::ItemId.eq(item_id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Unpaid))
            .order_by_desc(orders::Column::Id)
            .one(&self.conn)
            .await?;

        Ok(result)
    }

    /// Unpaid orders whose payment deadline (epoch seconds) is before `now`
    pub async fn sweep_expired(&self, now: i64) -> Result<Vec<orders::Model>, DbError> {
        let results = orders::Entity::find()
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Unpaid))
            .filter(orders::Column::PaymentExpiredTime.lt(now))
            .order_by_asc(orders::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(results)
    }

    /// Expire an unpaid order and fail its settlement in one statement.
    /// Returns 0 when the order was no longer unpaid.
    pub async fn mark_expired(&self, id: i64) -> Result<u64, DbError> {
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::PaymentStatus, Expr::value(PaymentStatus::Expired))
            .col_expr(orders::Column::OnChainStatus, Expr::value(OnChainStatus::Failed))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Unpaid))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Record a payment on an unpaid order.
    ///
    /// Only `Paid` is accepted here; expiry goes through [`Self::mark_expired`]
    /// so it also fails the settlement. Returns false when the order had
    /// already left `Unpaid`, which is how a watcher notices it lost a race.
    pub async fn confirm_payment(
        &self,
        id: i64,
        payment_ref: &str,
        new_status: PaymentStatus,
        scope: Option<&UnitOfWork>,
    ) -> Result<bool, DbError> {
        if new_status != PaymentStatus::Paid {
            return Err(DbError::Invariant(format!(
                "order {} can only be confirmed as paid, not {:?}",
                id, new_status
            )));
        }

        let rows = with_scope!(&self.conn, scope, |db| {
            Self::write_payment(db, id, payment_ref, new_status).await?
        });

        Ok(rows > 0)
    }

    async fn write_payment<C: ConnectionTrait>(
        db: &C,
        id: i64,
        payment_ref: &str,
        new_status: PaymentStatus,
    ) -> Result<u64, DbError> {
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::PaymentStatus, Expr::value(new_status))
            .col_expr(orders::Column::PaymentId, Expr::value(payment_ref))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::Id.eq(id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Unpaid))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// True when the item has no paid order yet
    pub async fn no_paid_order(&self, item_id: &str) -> Result<bool, DbError> {
        let found = orders::Entity::find()
            .filter(orders::Column::ItemId.eq(item_id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .one(&self.conn)
            .await?;

        Ok(found.is_none())
    }

    /// True when no unpaid order for the item expires after `expiry_floor`,
    /// i.e. an order with that deadline would be the live one.
    pub async fn is_latest_unpaid_order(
        &self,
        item_id: &str,
        expiry_floor: i64,
    ) -> Result<bool, DbError> {
        let found = orders::Entity::find()
            .filter(orders::Column::ItemId.eq(item_id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Unpaid))
            .filter(orders::Column::PaymentExpiredTime.gt(expiry_floor))
            .one(&self.conn)
            .await?;

        Ok(found.is_none())
    }

    /// Paid orders waiting for submission in one of the two queues
    pub async fn select_for_on_chain_submission(
        &self,
        sorted: bool,
        limit: u64,
    ) -> Result<Vec<orders::Model>, DbError> {
        let results = orders::Entity::find()
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .filter(orders::Column::OnChainStatus.eq(OnChainStatus::Waiting))
            .filter(orders::Column::Sort.eq(sorted))
            .order_by_asc(orders::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(results)
    }

    /// Move the paid orders of an item to `status`.
    ///
    /// Only orders currently in a legal predecessor state are touched, so
    /// terminal orders are never rewritten. Returns the number of orders moved.
    pub async fn update_on_chain_status(
        &self,
        item_id: &str,
        status: OnChainStatus,
        scope: Option<&UnitOfWork>,
    ) -> Result<u64, DbError> {
        let from = status.predecessors();
        if from.is_empty() {
            return Err(DbError::Invariant(format!(
                "no order may move back to {}",
                status.as_str()
            )));
        }

        Ok(with_scope!(&self.conn, scope, |db| {
            Self::write_on_chain_status(db, item_id, status, from).await?
        }))
    }

    /// Settle the orders anchored by a confirmed or failed transaction.
    ///
    /// Unlike [`Self::update_on_chain_status`] only pending orders move, so
    /// a failed transaction leaves newer waiting orders for the item alone.
    pub async fn settle_pending(
        &self,
        item_id: &str,
        status: OnChainStatus,
        scope: Option<&UnitOfWork>,
    ) -> Result<u64, DbError> {
        if !status.is_terminal() {
            return Err(DbError::Invariant(format!(
                "{} does not settle an order",
                status.as_str()
            )));
        }

        let from = [OnChainStatus::Pending];
        Ok(with_scope!(&self.conn, scope, |db| {
            Self::write_on_chain_status(db, item_id, status, &from).await?
        }))
    }

    async fn write_on_chain_status<C: ConnectionTrait>(
        db: &C,
        item_id: &str,
        status: OnChainStatus,
        from: &[OnChainStatus],
    ) -> Result<u64, DbError> {
        let result = orders::Entity::update_many()
            .col_expr(orders::Column::OnChainStatus, Expr::value(status))
            .col_expr(orders::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(orders::Column::ItemId.eq(item_id))
            .filter(orders::Column::PaymentStatus.eq(PaymentStatus::Paid))
            .filter(orders::Column::OnChainStatus.is_in(from.iter().copied()))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }

    /// An order for the item that is already pending or settled on chain
    pub async fn exists_processed_order(
        &self,
        item_id: &str,
    ) -> Result<Option<orders::Model>, DbError> {
        let result = orders::Entity::find()
            .filter(orders::Column::ItemId.eq(item_id))
            .filter(
                orders::Column::OnChainStatus
                    .is_in([OnChainStatus::Pending, OnChainStatus::Success]),
            )
            .one(&self.conn)
            .await?;

        Ok(result)
    }

    /// Newest-first page of a signer's orders, failed ones left out
    pub async fn list_by_signer(
        &self,
        signer: &str,
        cursor: Option<i64>,
        page_size: u64,
    ) -> Result<Vec<orders::Model>, DbError> {
        let mut query = orders::Entity::find()
            .filter(orders::Column::Signer.eq(signer))
            .filter(orders::Column::OnChainStatus.ne(OnChainStatus::Failed));

        if let Some(cursor) = cursor {
            query = query.filter(orders::Column::Id.lt(cursor));
        }

        let results = query
            .order_by_desc(orders::Column::Id)
            .limit(page_size)
            .all(&self.conn)
            .await?;

        Ok(results)
    }

    /// Keyset page of an API key's orders.
    ///
    /// Ascending pages return ids after `cursor`, descending pages ids before
    /// it; without a cursor the page starts at the oldest or newest order.
    pub async fn list_by_api_key(
        &self,
        api_key: &str,
        cursor: Option<i64>,
        page_size: u64,
        direction: SortDirection,
    ) -> Result<Vec<orders::Model>, DbError> {
        let mut query = orders::Entity::find().filter(orders::Column::ApiKey.eq(api_key));

        query = match (direction, cursor) {
            (SortDirection::Asc, Some(cursor)) => query.filter(orders::Column::Id.gt(cursor)),
            (SortDirection::Desc, Some(cursor)) => query.filter(orders::Column::Id.lt(cursor)),
            (_, None) => query,
        };

        query = match direction {
            SortDirection::Asc => query.order_by_asc(orders::Column::Id),
            SortDirection::Desc => query.order_by_desc(orders::Column::Id),
        };

        Ok(query.limit(page_size).all(&self.conn).await?)
    }
}
