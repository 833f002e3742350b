//! SeaORM Entity for orders table

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::status::{OnChainStatus, PaymentStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Monotonic id, also the pagination cursor
    #[sea_orm(primary_key)]
    pub id: i64,
    pub item_id: String,
    pub api_key: String,
    pub signer: String,
    pub payment_status: PaymentStatus,
    /// External payment reference, set once the order is paid
    #[sea_orm(nullable)]
    pub payment_id: Option<String>,
    /// Payment deadline, epoch seconds
    pub payment_expired_time: i64,
    pub on_chain_status: OnChainStatus,
    /// Sorted orders are bundled in batches, unsorted ones go out directly
    pub sort: bool,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
