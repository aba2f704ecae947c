//! Immutable trade log record.

use crate::domain::{Decimal, PlayerId, Season, TimeMs, TradeType, UserId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One settled buy or sell. Append-only; never updated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: UserId,
    pub season: Season,
    pub player_id: PlayerId,
    pub trade_type: TradeType,
    pub unit_price: Decimal,
    pub amount: i64,
    pub time_ms: TimeMs,
}

impl Transaction {
    /// Create a record with a fresh random id.
    pub fn new(
        user_id: UserId,
        season: Season,
        player_id: PlayerId,
        trade_type: TradeType,
        unit_price: Decimal,
        amount: i64,
        time_ms: TimeMs,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            season,
            player_id,
            trade_type,
            unit_price,
            amount,
            time_ms,
        }
    }

    /// Cash moved by this trade: `unit_price * amount`.
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from_shares(self.amount)
    }
}
