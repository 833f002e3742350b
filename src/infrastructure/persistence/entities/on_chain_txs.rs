//! SeaORM Entity for on_chain_txs table

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::TxStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "on_chain_txs")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Chain transaction id, absent until the bundle is posted
    #[sea_orm(nullable)]
    pub ar_id: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub item_ids: String, // JSON array of item ids
    pub cur_height: i64,
    pub data_size: i64,
    pub reward: String,
    pub status: TxStatus,
    #[sea_orm(nullable)]
    pub block_id: Option<String>,
    #[sea_orm(nullable)]
    pub block_height: Option<i64>,
    pub kafka_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Item ids anchored by this transaction
    pub fn item_ids(&self) -> Vec<String> {
        serde_json::from_str(&self.item_ids).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
