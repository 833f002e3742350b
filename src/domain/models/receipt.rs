use serde::{Deserialize, Serialize};

/// A payment observed on the payment rail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReceipt {
    pub raw_id: i64,
    pub ever_hash: String,
    /// Creation time on the rail, milliseconds
    pub nonce: i64,
    pub symbol: String,
    pub token_tag: String,
    pub from_address: String,
    pub amount: String,
    pub data: String,
}
