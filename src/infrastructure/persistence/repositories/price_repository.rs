//! Repository for token_prices

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::domain::models::PriceQuote;
use crate::infrastructure::persistence::entities::token_prices;
use crate::infrastructure::persistence::error::DbError;

/// Symbol whose price feeds fee and reward calculations
pub const AR_SYMBOL: &str = "AR";

#[derive(Clone, Debug)]
pub struct PriceRepository {
    conn: DatabaseConnection,
}

impl PriceRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert prices for unknown symbols; known symbols keep their price.
    /// Returns the number of rows written.
    pub async fn upsert_many(&self, prices: &[PriceQuote]) -> Result<u64, DbError> {
        if prices.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let models: Vec<token_prices::ActiveModel> = prices
            .iter()
            .map(|p| token_prices::ActiveModel {
                symbol: Set(p.symbol.clone()),
                price: Set(p.price),
                updated_at: Set(now),
            })
            .collect();

        let result = token_prices::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(token_prices::Column::Symbol)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await;

        match result {
            Ok(rows) => Ok(rows),
            // Every row conflicted, nothing inserted
            Err(DbErr::RecordNotInserted) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the cached price of a symbol
    pub async fn set_price(&self, symbol: &str, price: f64) -> Result<u64, DbError> {
        let result = token_prices::Entity::update_many()
            .col_expr(token_prices::Column::Price, Expr::value(price))
            .col_expr(token_prices::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(token_prices::Column::Symbol.eq(symbol))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn get_all(&self) -> Result<Vec<token_prices::Model>, DbError> {
        let results = token_prices::Entity::find()
            .order_by_asc(token_prices::Column::Symbol)
            .all(&self.conn)
            .await?;

        Ok(results)
    }

    pub async fn get_by_symbol(&self, symbol: &str) -> Result<f64, DbError> {
        token_prices::Entity::find_by_id(symbol.to_string())
            .one(&self.conn)
            .await?
            .map(|p| p.price)
            .ok_or_else(|| DbError::NotFound(format!("price for {}", symbol)))
    }

    pub async fn get_ar_price(&self) -> Result<f64, DbError> {
        self.get_by_symbol(AR_SYMBOL).await
    }
}
