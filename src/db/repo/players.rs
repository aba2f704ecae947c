//! Player catalog and price series operations for the repository.

use crate::domain::{Decimal, Player, PlayerId, PricePoint, TimeMs};
use sqlx::sqlite::SqliteConnection;
use sqlx::Row;
use std::collections::HashMap;

use super::{parse_decimal, Repository};

/// Descriptive fields of a player, without its price series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: String,
}

/// Result of appending a price observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// The observation was not later than the last stored one.
    OutOfOrder { last: TimeMs },
    UnknownPlayer,
}

impl Repository {
    /// Insert a player or refresh its descriptive fields. Price data is untouched.
    pub async fn upsert_player(&self, profile: &PlayerProfile) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO players (id, name, team, position, updated_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                team = excluded.team,
                position = excluded.position,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(profile.id.as_i64())
        .bind(profile.name.as_str())
        .bind(profile.team.as_str())
        .bind(profile.position.as_str())
        .bind(TimeMs::now().as_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Append a price observation and make it the player's current value.
    ///
    /// The series only grows forward in time; an observation at or before the
    /// last stored one is refused and nothing is written.
    pub async fn append_price(
        &self,
        player_id: PlayerId,
        point: PricePoint,
    ) -> Result<AppendOutcome, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM players WHERE id = ?")
            .bind(player_id.as_i64())
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        if !exists {
            return Ok(AppendOutcome::UnknownPlayer);
        }

        let last: Option<i64> =
            sqlx::query("SELECT MAX(time_ms) AS last_ms FROM player_prices WHERE player_id = ?")
                .bind(player_id.as_i64())
                .fetch_one(&mut *tx)
                .await?
                .get("last_ms");
        if let Some(last) = last.filter(|&last| point.time_ms.as_ms() <= last) {
            return Ok(AppendOutcome::OutOfOrder {
                last: TimeMs::new(last),
            });
        }

        sqlx::query("INSERT INTO player_prices (player_id, time_ms, amount) VALUES (?, ?, ?)")
            .bind(player_id.as_i64())
            .bind(point.time_ms.as_ms())
            .bind(point.amount.to_canonical_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE players SET current_value = ?, updated_at_ms = ? WHERE id = ?")
            .bind(point.amount.to_canonical_string())
            .bind(TimeMs::now().as_ms())
            .bind(player_id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(AppendOutcome::Appended)
    }

    /// All players with current values, ordered by id. Price series are left empty.
    pub async fn list_players(&self) -> Result<Vec<Player>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, team, position, current_value
            FROM players
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(player_from_row).collect()
    }

    /// One player with its full price series.
    pub async fn get_player(&self, player_id: PlayerId) -> Result<Option<Player>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, team, position, current_value
            FROM players
            WHERE id = ?
            "#,
        )
        .bind(player_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut player = player_from_row(&row)?;
        player.value_history = self
            .query_price_histories(&[player_id])
            .await?
            .remove(&player_id)
            .unwrap_or_default();
        Ok(Some(player))
    }

    /// Current trade price of a player, read inside an open transaction.
    pub async fn current_value_in(
        &self,
        conn: &mut SqliteConnection,
        player_id: PlayerId,
    ) -> Result<Option<Decimal>, sqlx::Error> {
        let row = sqlx::query("SELECT current_value FROM players WHERE id = ?")
            .bind(player_id.as_i64())
            .fetch_optional(&mut *conn)
            .await?;

        row.map(|r| parse_decimal("players.current_value", &r.get::<String, _>("current_value")))
            .transpose()
    }

    /// Price series for each requested player, ordered by time.
    ///
    /// Players without observations are absent from the map.
    pub async fn query_price_histories(
        &self,
        player_ids: &[PlayerId],
    ) -> Result<HashMap<PlayerId, Vec<PricePoint>>, sqlx::Error> {
        let mut histories: HashMap<PlayerId, Vec<PricePoint>> = HashMap::new();
        if player_ids.is_empty() {
            return Ok(histories);
        }

        let placeholders = vec!["?"; player_ids.len()].join(", ");
        let sql = format!(
            r#"
            SELECT player_id, time_ms, amount
            FROM player_prices
            WHERE player_id IN ({})
            ORDER BY player_id ASC, time_ms ASC
            "#,
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for id in player_ids {
            query = query.bind(id.as_i64());
        }
        let rows = query.fetch_all(&self.pool).await?;

        for row in rows {
            let player_id = PlayerId::new(row.get::<i64, _>("player_id"));
            let amount = parse_decimal("player_prices.amount", &row.get::<String, _>("amount"))?;
            histories
                .entry(player_id)
                .or_default()
                .push(PricePoint::new(TimeMs::new(row.get::<i64, _>("time_ms")), amount));
        }

        Ok(histories)
    }
}

fn player_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Player, sqlx::Error> {
    Ok(Player {
        id: PlayerId::new(row.get::<i64, _>("id")),
        name: row.get("name"),
        team: row.get("team"),
        position: row.get("position"),
        current_value: parse_decimal(
            "players.current_value",
            &row.get::<String, _>("current_value"),
        )?,
        value_history: Vec::new(),
    })
}
