//! SeaORM Entity for receipt_txs table
//! Incoming payments from the payment rail and the refunds issued against them.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::ReceiptStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipt_txs")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Feed position on the payment rail
    #[sea_orm(primary_key, auto_increment = false)]
    pub raw_id: i64,
    pub ever_hash: String,
    /// Creation time on the rail, milliseconds
    pub nonce: i64,
    pub symbol: String,
    pub token_tag: String,
    pub from_address: String,
    pub amount: String,
    /// Item id the payment is for
    #[sea_orm(column_type = "Text")]
    pub data: String,
    pub status: ReceiptStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub err_msg: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
