pub mod manifest_repository;
pub mod on_chain_tx_repository;
pub mod order_repository;
pub mod price_repository;
pub mod refund_repository;
pub mod statistics_repository;

pub use manifest_repository::ManifestRepository;
pub use on_chain_tx_repository::OnChainTxRepository;
pub use order_repository::OrderRepository;
pub use price_repository::PriceRepository;
pub use refund_repository::RefundRepository;
pub use statistics_repository::StatisticsRepository;

/// Collection of all repositories
#[derive(Clone, Debug)]
pub struct Repositories {
    /// Order ledger
    pub order: OrderRepository,
    /// Chain settlement tracker
    pub on_chain_tx: OnChainTxRepository,
    /// Refund tracker
    pub refund: RefundRepository,
    /// Price cache
    pub price: PriceRepository,
    pub manifest: ManifestRepository,
    /// Statistics engine
    pub statistics: StatisticsRepository,
}

impl Repositories {
    /// Create a new Repositories instance
    pub fn new(
        order: OrderRepository,
        on_chain_tx: OnChainTxRepository,
        refund: RefundRepository,
        price: PriceRepository,
        manifest: ManifestRepository,
        statistics: StatisticsRepository,
    ) -> Self {
        Self {
            order,
            on_chain_tx,
            refund,
            price,
            manifest,
            statistics,
        }
    }
}
