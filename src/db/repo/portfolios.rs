//! Portfolio balance and holding operations for the repository.

use crate::domain::{Decimal, PlayerId, Portfolio, PortfolioAsset, Season, TimeMs, UserId};
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;

use super::{parse_decimal, Repository};

impl Repository {
    /// Load the portfolio for (user, season), creating it with `starting_balance`
    /// on first access.
    pub async fn get_or_create_portfolio(
        &self,
        user_id: &UserId,
        season: &Season,
        starting_balance: Decimal,
    ) -> Result<Portfolio, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let portfolio = self
            .load_or_create_portfolio_in(&mut tx, user_id, season, starting_balance)
            .await?;
        tx.commit().await?;
        Ok(portfolio)
    }

    /// Same as [`Repository::get_or_create_portfolio`], inside an open transaction.
    pub async fn load_or_create_portfolio_in(
        &self,
        conn: &mut SqliteConnection,
        user_id: &UserId,
        season: &Season,
        starting_balance: Decimal,
    ) -> Result<Portfolio, sqlx::Error> {
        let now = TimeMs::now().as_ms();
        sqlx::query(
            r#"
            INSERT INTO portfolios (user_id, season, balance, created_at_ms, updated_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id, season) DO NOTHING
            "#,
        )
        .bind(user_id.as_str())
        .bind(season.as_str())
        .bind(starting_balance.to_canonical_string())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        let row = sqlx::query("SELECT balance FROM portfolios WHERE user_id = ? AND season = ?")
            .bind(user_id.as_str())
            .bind(season.as_str())
            .fetch_one(&mut *conn)
            .await?;
        let balance = parse_decimal("portfolios.balance", &row.get::<String, _>("balance"))?;

        let asset_rows = sqlx::query(
            r#"
            SELECT player_id, amount, average_value
            FROM portfolio_assets
            WHERE user_id = ? AND season = ?
            ORDER BY player_id ASC
            "#,
        )
        .bind(user_id.as_str())
        .bind(season.as_str())
        .fetch_all(&mut *conn)
        .await?;

        let assets = asset_rows
            .iter()
            .map(|r| -> Result<PortfolioAsset, sqlx::Error> {
                Ok(PortfolioAsset {
                    player_id: PlayerId::new(r.get::<i64, _>("player_id")),
                    amount: r.get::<i64, _>("amount"),
                    average_value: parse_decimal(
                        "portfolio_assets.average_value",
                        &r.get::<String, _>("average_value"),
                    )?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(Portfolio {
            user_id: user_id.clone(),
            season: season.clone(),
            balance,
            assets,
        })
    }

    /// Persist the balance and one player's holding after a trade.
    ///
    /// A holding absent from `portfolio` is deleted, so a fully sold asset
    /// never lingers at zero.
    pub async fn write_trade_state_in(
        &self,
        conn: &mut SqliteConnection,
        portfolio: &Portfolio,
        player_id: PlayerId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE portfolios
            SET balance = ?, updated_at_ms = ?
            WHERE user_id = ? AND season = ?
            "#,
        )
        .bind(portfolio.balance.to_canonical_string())
        .bind(TimeMs::now().as_ms())
        .bind(portfolio.user_id.as_str())
        .bind(portfolio.season.as_str())
        .execute(&mut *conn)
        .await?;

        match portfolio.asset(player_id) {
            Some(asset) => {
                sqlx::query(
                    r#"
                    INSERT INTO portfolio_assets (user_id, season, player_id, amount, average_value)
                    VALUES (?, ?, ?, ?, ?)
                    ON CONFLICT(user_id, season, player_id) DO UPDATE SET
                        amount = excluded.amount,
                        average_value = excluded.average_value
                    "#,
                )
                .bind(portfolio.user_id.as_str())
                .bind(portfolio.season.as_str())
                .bind(player_id.as_i64())
                .bind(asset.amount)
                .bind(asset.average_value.to_canonical_string())
                .execute(&mut *conn)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    DELETE FROM portfolio_assets
                    WHERE user_id = ? AND season = ? AND player_id = ?
                    "#,
                )
                .bind(portfolio.user_id.as_str())
                .bind(portfolio.season.as_str())
                .bind(player_id.as_i64())
                .execute(&mut *conn)
                .await?;
            }
        }

        Ok(())
    }
}
