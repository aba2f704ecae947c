//! Services that combine repository access with the pure engine.

pub mod broker;

pub use broker::{Broker, BrokerError, TradeReceipt, Valuation};
