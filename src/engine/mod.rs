//! Pure computation for trade settlement and portfolio valuation.
//!
//! Nothing here touches the database; callers load state, apply a rule and
//! persist the result.

pub mod settlement;
pub mod valuation;

pub use settlement::{settle_buy, settle_sell, Settlement, TradeError};
pub use valuation::{value_history, ValuationError, ValuePoint};
