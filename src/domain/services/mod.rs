pub mod event_publisher;
pub mod payment_service;
pub mod settlement_service;
pub mod statistics_service;

pub use event_publisher::EventPublisher;
pub use payment_service::PaymentService;
pub use settlement_service::SettlementService;
pub use statistics_service::StatisticsService;
