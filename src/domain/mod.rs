//! Domain types for the fantasy player market.
//!
//! This module provides:
//! - Exact currency arithmetic via the Decimal wrapper
//! - Identifiers and small value types: TimeMs, UserId, PlayerId, Season, TradeType
//! - Player, Portfolio and Transaction records

pub mod decimal;
pub mod player;
pub mod portfolio;
pub mod primitives;
pub mod transaction;

pub use decimal::Decimal;
pub use player::{Player, PricePoint};
pub use portfolio::{Portfolio, PortfolioAsset};
pub use primitives::{PlayerId, Season, SeasonParseError, TimeMs, TradeType, UserId};
pub use transaction::Transaction;
