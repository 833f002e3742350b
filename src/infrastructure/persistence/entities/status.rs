//! Closed status sets stored as short strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment state of an order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl PaymentStatus {
    /// Unpaid is the only state a payment can leave
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Unpaid)
    }
}

/// Settlement state of an order. Declaration order is the report order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum OnChainStatus {
    #[sea_orm(string_value = "waiting")]
    Waiting,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl OnChainStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OnChainStatus::Waiting => "waiting",
            OnChainStatus::Pending => "pending",
            OnChainStatus::Success => "success",
            OnChainStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OnChainStatus::Success | OnChainStatus::Failed)
    }

    /// States an order may be in right before moving to `self`
    pub fn predecessors(self) -> &'static [OnChainStatus] {
        match self {
            OnChainStatus::Waiting => &[],
            OnChainStatus::Pending => &[OnChainStatus::Waiting],
            OnChainStatus::Success => &[OnChainStatus::Pending],
            OnChainStatus::Failed => &[OnChainStatus::Waiting, OnChainStatus::Pending],
        }
    }

    pub fn can_transition_to(self, next: OnChainStatus) -> bool {
        next.predecessors().contains(&self)
    }
}

/// Status of a ledger-anchoring transaction
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl TxStatus {
    /// Order status an anchored order takes once its transaction reaches `self`
    pub fn order_status(self) -> OnChainStatus {
        match self {
            TxStatus::Pending => OnChainStatus::Pending,
            TxStatus::Success => OnChainStatus::Success,
            TxStatus::Failed => OnChainStatus::Failed,
        }
    }
}

/// Status of a payment receipt and of the refund issued against it
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReceiptStatus {
    /// Received, not yet matched to an order
    #[sea_orm(string_value = "unspent")]
    Unspent,
    /// Paid for an order
    #[sea_orm(string_value = "spent")]
    Spent,
    /// Needs a refund
    #[sea_orm(string_value = "unrefund")]
    Unrefund,
    #[sea_orm(string_value = "refunded")]
    Refunded,
    /// Refund attempt failed; see `err_msg`
    #[sea_orm(string_value = "refund_error")]
    RefundError,
}
