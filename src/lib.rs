//! Order and settlement ledger for a storage bundler.
//!
//! Tracks storage orders from payment through on-chain settlement, the
//! ledger-anchoring transactions that settle them, refunds, cached token
//! prices and daily statistics.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod utils;
