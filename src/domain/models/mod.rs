pub mod order;
pub mod page;
pub mod price;
pub mod receipt;
pub mod settlement;
pub mod statistics;

pub use order::NewOrder;
pub use page::{cursor_from_raw, SortDirection};
pub use price::PriceQuote;
pub use receipt::NewReceipt;
pub use settlement::{ChainProof, SettlementOutcome, Submission};
pub use statistics::{DailyRollup, DayRange, StatusTotals, TimeWindow};
