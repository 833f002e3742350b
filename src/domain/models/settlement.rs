use serde::{Deserialize, Serialize};

use crate::infrastructure::persistence::entities::TxStatus;

/// Block inclusion reported by the chain for a confirmed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainProof {
    pub block_id: String,
    pub block_height: i64,
}

/// Details of a posted ledger-anchoring transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub ar_id: String,
    /// Chain height when the transaction was posted
    pub cur_height: i64,
    pub data_size: i64,
    /// Fee paid, in the chain's smallest unit
    pub reward: String,
}

/// Final verdict of the chain on a posted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    Confirmed(ChainProof),
    Failed,
}

impl SettlementOutcome {
    pub fn tx_status(&self) -> TxStatus {
        match self {
            SettlementOutcome::Confirmed(_) => TxStatus::Success,
            SettlementOutcome::Failed => TxStatus::Failed,
        }
    }

    pub fn proof(&self) -> Option<&ChainProof> {
        match self {
            SettlementOutcome::Confirmed(proof) => Some(proof),
            SettlementOutcome::Failed => None,
        }
    }
}
