//! Per-season portfolio: cash balance plus share holdings.

use crate::domain::{Decimal, PlayerId, Season, UserId};
use serde::{Deserialize, Serialize};

/// A holding of shares in one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioAsset {
    pub player_id: PlayerId,
    /// Always >= 1; a holding that drops to zero is removed.
    pub amount: i64,
    /// Weighted-average purchase price per share.
    pub average_value: Decimal,
}

/// A user's portfolio for one season, keyed by (user_id, season).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub user_id: UserId,
    pub season: Season,
    /// Never negative.
    pub balance: Decimal,
    pub assets: Vec<PortfolioAsset>,
}

impl Portfolio {
    /// Fresh portfolio holding only cash.
    pub fn new(user_id: UserId, season: Season, starting_balance: Decimal) -> Self {
        Self {
            user_id,
            season,
            balance: starting_balance,
            assets: Vec::new(),
        }
    }

    pub fn asset(&self, player_id: PlayerId) -> Option<&PortfolioAsset> {
        self.assets.iter().find(|a| a.player_id == player_id)
    }
}
