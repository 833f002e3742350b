pub mod manifests;
pub mod on_chain_txs;
pub mod order_statistics;
pub mod orders;
pub mod receipt_txs;
pub mod status;
pub mod token_prices;

pub use status::{OnChainStatus, PaymentStatus, ReceiptStatus, TxStatus};
