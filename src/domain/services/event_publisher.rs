//! Downstream sink for settled transactions

use async_trait::async_trait;

use crate::domain::errors::PublishError;
use crate::infrastructure::persistence::entities::on_chain_txs;

/// Sends settlement events to the event bus
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publisher name for identification in logs
    fn publisher_name(&self) -> String;

    /// Publish one settled transaction
    async fn publish(&self, tx: &on_chain_txs::Model) -> Result<(), PublishError>;
}
