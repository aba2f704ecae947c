//! Player catalog entry and its price series.

use crate::domain::{Decimal, PlayerId, TimeMs};
use serde::{Deserialize, Serialize};

/// One observation in a player's price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time_ms: TimeMs,
    pub amount: Decimal,
}

impl PricePoint {
    pub fn new(time_ms: TimeMs, amount: Decimal) -> Self {
        Self { time_ms, amount }
    }
}

/// A tradable football player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: String,
    /// Price every trade settles at; equals the last observation's amount.
    pub current_value: Decimal,
    /// Strictly increasing in `time_ms`; only ever appended to.
    pub value_history: Vec<PricePoint>,
}
