use crate::domain::{Decimal, PlayerId, Portfolio, PortfolioAsset, TradeType};
use thiserror::Error;

/// Reasons a trade is refused. A refused trade leaves the portfolio untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    #[error("amount must be at least 1, got {0}")]
    InvalidAmount(i64),
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("player {0} has no tradable price")]
    InvalidPrice(PlayerId),
    #[error("insufficient funds: trade costs {required}, balance is {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },
    #[error("no holding for player {0}")]
    AssetNotFound(PlayerId),
    #[error("insufficient holdings: tried to sell {requested}, holding {held}")]
    InsufficientHoldings { requested: i64, held: i64 },
    #[error("trade value out of range")]
    Overflow,
}

/// Outcome of a settled trade, used to write the transaction log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub trade_type: TradeType,
    pub player_id: PlayerId,
    pub unit_price: Decimal,
    pub amount: i64,
    /// Cash debited (buy) or credited (sell).
    pub total: Decimal,
}

/// Buy `amount` shares of `player_id` at `unit_price`.
///
/// Adds to an existing holding with a recomputed weighted-average cost, or
/// opens a new one at `unit_price`. The balance is debited by the full cost.
pub fn settle_buy(
    portfolio: &mut Portfolio,
    player_id: PlayerId,
    unit_price: Decimal,
    amount: i64,
) -> Result<Settlement, TradeError> {
    validate(player_id, unit_price, amount)?;

    let cost = unit_price
        .checked_mul(Decimal::from_shares(amount))
        .ok_or(TradeError::Overflow)?;
    if cost > portfolio.balance {
        return Err(TradeError::InsufficientFunds {
            required: cost,
            available: portfolio.balance,
        });
    }
    let new_balance = portfolio
        .balance
        .checked_sub(cost)
        .ok_or(TradeError::Overflow)?;

    match portfolio.assets.iter_mut().find(|a| a.player_id == player_id) {
        Some(asset) => {
            let new_amount = asset.amount.checked_add(amount).ok_or(TradeError::Overflow)?;
            let new_average = asset
                .average_value
                .checked_mul(Decimal::from_shares(asset.amount))
                .and_then(|held_cost| held_cost.checked_add(cost))
                .and_then(|total_cost| total_cost.checked_div(Decimal::from_shares(new_amount)))
                .ok_or(TradeError::Overflow)?;
            asset.amount = new_amount;
            asset.average_value = new_average;
        }
        None => portfolio.assets.push(PortfolioAsset {
            player_id,
            amount,
            average_value: unit_price,
        }),
    }
    portfolio.balance = new_balance;

    Ok(Settlement {
        trade_type: TradeType::Buy,
        player_id,
        unit_price,
        amount,
        total: cost,
    })
}

/// Sell `amount` shares of `player_id` at `unit_price`.
///
/// The average cost of what remains is left as is. A holding sold down to
/// zero is removed from the portfolio.
pub fn settle_sell(
    portfolio: &mut Portfolio,
    player_id: PlayerId,
    unit_price: Decimal,
    amount: i64,
) -> Result<Settlement, TradeError> {
    validate(player_id, unit_price, amount)?;

    let index = portfolio
        .assets
        .iter()
        .position(|a| a.player_id == player_id)
        .ok_or(TradeError::AssetNotFound(player_id))?;
    let held = portfolio.assets[index].amount;
    if amount > held {
        return Err(TradeError::InsufficientHoldings {
            requested: amount,
            held,
        });
    }

    let proceeds = unit_price
        .checked_mul(Decimal::from_shares(amount))
        .ok_or(TradeError::Overflow)?;
    let new_balance = portfolio
        .balance
        .checked_add(proceeds)
        .ok_or(TradeError::Overflow)?;

    if amount == held {
        portfolio.assets.remove(index);
    } else {
        portfolio.assets[index].amount = held - amount;
    }
    portfolio.balance = new_balance;

    Ok(Settlement {
        trade_type: TradeType::Sell,
        player_id,
        unit_price,
        amount,
        total: proceeds,
    })
}

fn validate(player_id: PlayerId, unit_price: Decimal, amount: i64) -> Result<(), TradeError> {
    if amount < 1 {
        return Err(TradeError::InvalidAmount(amount));
    }
    if !unit_price.is_positive() {
        return Err(TradeError::InvalidPrice(player_id));
    }
    Ok(())
}
