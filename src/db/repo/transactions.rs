//! Trade log operations for the repository.

use crate::domain::{PlayerId, Season, TimeMs, Transaction, TradeType, UserId};
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use std::str::FromStr;

use super::{parse_decimal, Repository};

/// Optional narrowing of a user's trade history.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub season: Option<Season>,
    pub player_id: Option<PlayerId>,
    pub limit: Option<u32>,
}

impl Repository {
    /// Append a trade record inside an open transaction.
    pub async fn insert_transaction_in(
        &self,
        conn: &mut SqliteConnection,
        transaction: &Transaction,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, season, player_id, trade_type, unit_price, amount, time_ms
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.id.as_str())
        .bind(transaction.user_id.as_str())
        .bind(transaction.season.as_str())
        .bind(transaction.player_id.as_i64())
        .bind(transaction.trade_type.as_str())
        .bind(transaction.unit_price.to_canonical_string())
        .bind(transaction.amount)
        .bind(transaction.time_ms.as_ms())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// A user's trades, newest first.
    ///
    /// Recency is insertion order, so a wall clock stepping backwards between
    /// trades does not reorder history.
    pub async fn query_transactions(
        &self,
        user_id: &UserId,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, season, player_id, trade_type, unit_price, amount, time_ms
            FROM transactions
            WHERE user_id = ?
              AND (? IS NULL OR season = ?)
              AND (? IS NULL OR player_id = ?)
            ORDER BY seq DESC
            LIMIT ?
            "#,
        )
        .bind(user_id.as_str())
        .bind(filter.season.as_ref().map(|s| s.as_str()))
        .bind(filter.season.as_ref().map(|s| s.as_str()))
        .bind(filter.player_id.map(|p| p.as_i64()))
        .bind(filter.player_id.map(|p| p.as_i64()))
        .bind(filter.limit.map(i64::from).unwrap_or(-1))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Transaction, sqlx::Error> {
                let trade_type = TradeType::from_str(&row.get::<String, _>("trade_type"))
                    .map_err(|e| sqlx::Error::Decode(e.into()))?;
                let season = Season::from_str(&row.get::<String, _>("season"))
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

                Ok(Transaction {
                    id: row.get("id"),
                    user_id: UserId::new(row.get("user_id")),
                    season,
                    player_id: PlayerId::new(row.get::<i64, _>("player_id")),
                    trade_type,
                    unit_price: parse_decimal(
                        "transactions.unit_price",
                        &row.get::<String, _>("unit_price"),
                    )?,
                    amount: row.get::<i64, _>("amount"),
                    time_ms: TimeMs::new(row.get::<i64, _>("time_ms")),
                })
            })
            .collect()
    }
}
