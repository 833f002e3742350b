//! Repository for order statistics
//! Live per-status snapshots over orders and the persisted daily rollups.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, Iterable, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use crate::domain::models::statistics::format_day;
use crate::domain::models::{DailyRollup, DayRange, StatusTotals, TimeWindow};
use crate::infrastructure::persistence::entities::{order_statistics, orders, OnChainStatus};
use crate::infrastructure::persistence::error::DbError;

// SUM over BIGINT is NUMERIC on Postgres; cast so every backend yields i64
const SUM_SIZE: &str = "CAST(COALESCE(SUM(size), 0) AS BIGINT)";

#[derive(Debug, FromQueryResult)]
struct StatusRow {
    status: OnChainStatus,
    totals: i64,
    total_data_size: i64,
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    totals: i64,
    total_data_size: i64,
}

#[derive(Clone, Debug)]
pub struct StatisticsRepository {
    conn: DatabaseConnection,
}

impl StatisticsRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Order count and volume for every settlement status.
    ///
    /// Always one entry per known status, in report order, zero-filled
    /// where no order currently has that status.
    pub async fn snapshot_by_status(&self) -> Result<Vec<StatusTotals>, DbError> {
        let rows = orders::Entity::find()
            .select_only()
            .column_as(orders::Column::OnChainStatus, "status")
            .column_as(Expr::cust("COUNT(*)"), "totals")
            .column_as(Expr::cust(SUM_SIZE), "total_data_size")
            .group_by(orders::Column::OnChainStatus)
            .into_model::<StatusRow>()
            .all(&self.conn)
            .await?;

        let mut grouped: HashMap<OnChainStatus, StatusRow> =
            rows.into_iter().map(|r| (r.status, r)).collect();

        Ok(OnChainStatus::iter()
            .map(|status| match grouped.remove(&status) {
                Some(row) => StatusTotals {
                    status,
                    totals: row.totals,
                    total_data_size: row.total_data_size,
                },
                None => StatusTotals::empty(status),
            })
            .collect())
    }

    /// The snapshot as the JSON payload served to reporting
    pub async fn snapshot_json(&self) -> Result<String, DbError> {
        let snapshot = self.snapshot_by_status().await?;
        serde_json::to_string(&snapshot)
            .map_err(|e| DbError::InvalidInput(format!("snapshot encoding: {}", e)))
    }

    /// Persisted rollups within an inclusive day range, oldest first.
    /// Rollups only track settled volume, so each carries the success status.
    pub async fn rollup_range(&self, range: &DayRange) -> Result<Vec<DailyRollup>, DbError> {
        let rows = order_statistics::Entity::find()
            .filter(order_statistics::Column::Date.gte(range.start))
            .filter(order_statistics::Column::Date.lte(range.end))
            .order_by_asc(order_statistics::Column::Date)
            .all(&self.conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailyRollup {
                date: format_day(row.date),
                result: StatusTotals {
                    status: OnChainStatus::Success,
                    totals: row.totals,
                    total_data_size: row.total_data_size,
                },
            })
            .collect())
    }

    /// Count and volume of orders settled successfully within `window`,
    /// judged by their last update time
    pub async fn window_totals(&self, window: &TimeWindow) -> Result<StatusTotals, DbError> {
        let row = orders::Entity::find()
            .select_only()
            .column_as(Expr::cust("COUNT(*)"), "totals")
            .column_as(Expr::cust(SUM_SIZE), "total_data_size")
            .filter(orders::Column::UpdatedAt.gte(window.start))
            .filter(orders::Column::UpdatedAt.lt(window.end))
            .filter(orders::Column::OnChainStatus.eq(OnChainStatus::Success))
            .into_model::<TotalsRow>()
            .one(&self.conn)
            .await?;

        Ok(row
            .map(|r| StatusTotals {
                status: OnChainStatus::Success,
                totals: r.totals,
                total_data_size: r.total_data_size,
            })
            .unwrap_or_else(|| StatusTotals::empty(OnChainStatus::Success)))
    }

    /// True while no rollup exists for any day touched by `window`
    pub async fn needs_rollup(&self, window: &TimeWindow) -> Result<bool, DbError> {
        let existing = order_statistics::Entity::find()
            .filter(order_statistics::Column::Date.gte(window.start_day()))
            .filter(order_statistics::Column::Date.lt(window.end_day()))
            .one(&self.conn)
            .await?;

        Ok(existing.is_none())
    }

    /// Persist the rollup for a day unless one exists already.
    /// Returns whether a row was written.
    pub async fn record_daily(
        &self,
        date: NaiveDate,
        totals: i64,
        total_data_size: i64,
    ) -> Result<bool, DbError> {
        let now = Utc::now();
        let model = order_statistics::ActiveModel {
            id: sea_orm::NotSet,
            date: Set(date),
            totals: Set(totals),
            total_data_size: Set(total_data_size),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = order_statistics::Entity::insert(model)
            .on_conflict(
                OnConflict::column(order_statistics::Column::Date)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await;

        match result {
            Ok(rows) if rows > 0 => Ok(true),
            Ok(_) | Err(DbErr::RecordNotInserted) => {
                debug!("rollup for {} already recorded", date);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
