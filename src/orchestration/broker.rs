use crate::db::Repository;
use crate::domain::{Decimal, PlayerId, Portfolio, Season, TimeMs, TradeType, Transaction, UserId};
use crate::engine::{settle_buy, settle_sell, value_history, TradeError, ValuationError, ValuePoint};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Settles trades and values portfolios against the repository.
#[derive(Clone)]
pub struct Broker {
    repo: Arc<Repository>,
    starting_balance: Decimal,
}

/// A committed trade: the log record and the portfolio it produced.
#[derive(Debug, Clone)]
pub struct TradeReceipt {
    pub transaction: Transaction,
    pub portfolio: Portfolio,
}

#[derive(Debug, Clone)]
pub struct Valuation {
    pub portfolio: Portfolio,
    pub history: Vec<ValuePoint>,
}

impl Broker {
    pub fn new(repo: Arc<Repository>, starting_balance: Decimal) -> Self {
        Self {
            repo,
            starting_balance,
        }
    }

    pub async fn buy(
        &self,
        user_id: &UserId,
        season: &Season,
        player_id: PlayerId,
        amount: i64,
    ) -> Result<TradeReceipt, BrokerError> {
        self.execute(TradeType::Buy, user_id, season, player_id, amount)
            .await
    }

    pub async fn sell(
        &self,
        user_id: &UserId,
        season: &Season,
        player_id: PlayerId,
        amount: i64,
    ) -> Result<TradeReceipt, BrokerError> {
        self.execute(TradeType::Sell, user_id, season, player_id, amount)
            .await
    }

    /// Run one trade as a single read-modify-write transaction.
    ///
    /// Balance, holding and log record commit together or not at all; any
    /// early return drops the transaction, which rolls it back.
    async fn execute(
        &self,
        trade_type: TradeType,
        user_id: &UserId,
        season: &Season,
        player_id: PlayerId,
        amount: i64,
    ) -> Result<TradeReceipt, BrokerError> {
        let mut tx = self.repo.begin().await?;

        // the lazy insert takes SQLite's write lock before anything is read
        let mut portfolio = self
            .repo
            .load_or_create_portfolio_in(&mut tx, user_id, season, self.starting_balance)
            .await?;
        let unit_price = self
            .repo
            .current_value_in(&mut tx, player_id)
            .await?
            .ok_or(TradeError::PlayerNotFound(player_id))?;

        let settled = match trade_type {
            TradeType::Buy => settle_buy(&mut portfolio, player_id, unit_price, amount),
            TradeType::Sell => settle_sell(&mut portfolio, player_id, unit_price, amount),
        };
        let settlement = match settled {
            Ok(s) => s,
            Err(e) => {
                debug!(
                    user = %user_id,
                    season = %season,
                    player = %player_id,
                    amount,
                    side = %trade_type,
                    reason = %e,
                    "Trade rejected"
                );
                return Err(e.into());
            }
        };

        self.repo
            .write_trade_state_in(&mut tx, &portfolio, player_id)
            .await?;

        let transaction = Transaction::new(
            user_id.clone(),
            season.clone(),
            settlement.player_id,
            settlement.trade_type,
            settlement.unit_price,
            settlement.amount,
            TimeMs::now(),
        );
        self.repo.insert_transaction_in(&mut tx, &transaction).await?;

        tx.commit().await?;

        info!(
            user = %user_id,
            season = %season,
            player = %player_id,
            amount,
            side = %trade_type,
            unit_price = %settlement.unit_price,
            total = %settlement.total,
            balance = %portfolio.balance,
            "Trade settled"
        );

        Ok(TradeReceipt {
            transaction,
            portfolio,
        })
    }

    /// The user's portfolio for a season, created on first access.
    pub async fn portfolio(&self, user_id: &UserId, season: &Season) -> Result<Portfolio, BrokerError> {
        Ok(self
            .repo
            .get_or_create_portfolio(user_id, season, self.starting_balance)
            .await?)
    }

    /// Portfolio worth per calendar date, rebuilt from current holdings.
    pub async fn valuation(&self, user_id: &UserId, season: &Season) -> Result<Valuation, BrokerError> {
        let portfolio = self.portfolio(user_id, season).await?;
        let player_ids: Vec<PlayerId> = portfolio.assets.iter().map(|a| a.player_id).collect();
        let histories = self.repo.query_price_histories(&player_ids).await?;
        let history = value_history(&portfolio, &histories)?;

        Ok(Valuation { portfolio, history })
    }
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Trade(#[from] TradeError),
    #[error(transparent)]
    Valuation(#[from] ValuationError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}
