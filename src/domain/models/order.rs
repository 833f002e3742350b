use serde::{Deserialize, Serialize};

/// A storage purchase request as submitted by a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    /// Business key of the stored item
    pub item_id: String,
    pub api_key: String,
    pub signer: String,
    /// Payment deadline, epoch seconds
    pub payment_expired_time: i64,
    /// Whether the order joins the batched (sorted) submission queue
    pub sort: bool,
    /// Data size in bytes
    pub size: i64,
}
