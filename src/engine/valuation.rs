use crate::domain::{Decimal, PlayerId, Portfolio, PricePoint};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Total portfolio worth on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValuationError {
    #[error("portfolio value out of range")]
    Overflow,
}

/// Rebuild a portfolio's value per calendar date from its holdings' price series.
///
/// Every held asset contributes `price * amount` on each date its player has an
/// observation; contributions on the same date are summed across assets, and the
/// cash balance is added to every date. When a player has several observations
/// on one date the last of them is used. Output is ascending by date.
pub fn value_history(
    portfolio: &Portfolio,
    histories: &HashMap<PlayerId, Vec<PricePoint>>,
) -> Result<Vec<ValuePoint>, ValuationError> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();

    for asset in &portfolio.assets {
        let Some(history) = histories.get(&asset.player_id) else {
            continue;
        };
        let shares = Decimal::from_shares(asset.amount);

        for (date, price) in daily_closes(history) {
            let worth = price.checked_mul(shares).ok_or(ValuationError::Overflow)?;
            let bucket = buckets.entry(date).or_insert_with(Decimal::zero);
            *bucket = bucket.checked_add(worth).ok_or(ValuationError::Overflow)?;
        }
    }

    buckets
        .into_iter()
        .map(|(date, holdings)| {
            holdings
                .checked_add(portfolio.balance)
                .map(|total_value| ValuePoint { date, total_value })
                .ok_or(ValuationError::Overflow)
        })
        .collect()
}

/// Last observed price per calendar date. Input must be ordered by time.
fn daily_closes(history: &[PricePoint]) -> Vec<(NaiveDate, Decimal)> {
    let mut closes: Vec<(NaiveDate, Decimal)> = Vec::with_capacity(history.len());
    for point in history {
        let date = point.time_ms.date();
        match closes.last_mut() {
            Some((last_date, price)) if *last_date == date => *price = point.amount,
            _ => closes.push((date, point.amount)),
        }
    }
    closes
}
