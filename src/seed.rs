//! Startup loader for player price data exported to CSV.
//!
//! Expected header: `player_id,name,team,position,date,price` with dates as
//! `YYYY-MM-DD`. Rows may arrive in any order; each player's observations are
//! appended chronologically, and ones already stored are skipped, so loading
//! the same file twice is harmless.

use crate::db::{AppendOutcome, PlayerProfile, Repository};
use crate::domain::{Decimal, PlayerId, PricePoint, TimeMs};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedRow {
    pub player_id: i64,
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub position: String,
    pub date: NaiveDate,
    pub price: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub players: usize,
    pub appended: usize,
    pub skipped: usize,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: invalid price {value:?}")]
    InvalidPrice { row: usize, value: String },
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Parse seed rows, ordered by (player_id, date).
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<(SeedRow, Decimal)>, SeedError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, record) in csv_reader.deserialize::<SeedRow>().enumerate() {
        let row = record?;
        let price = Decimal::from_str_canonical(&row.price)
            .ok()
            .filter(|p| p.is_positive())
            .ok_or_else(|| SeedError::InvalidPrice {
                row: i + 1,
                value: row.price.clone(),
            })?;
        rows.push((row, price));
    }

    rows.sort_by(|(a, _), (b, _)| a.player_id.cmp(&b.player_id).then(a.date.cmp(&b.date)));
    Ok(rows)
}

pub async fn load_players_csv(repo: &Repository, path: &Path) -> Result<SeedReport, SeedError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    let rows = parse_rows(file)?;
    let report = apply_rows(repo, rows).await?;

    info!(
        path = %path.display(),
        players = report.players,
        appended = report.appended,
        skipped = report.skipped,
        "Player seed loaded"
    );
    Ok(report)
}

async fn apply_rows(
    repo: &Repository,
    rows: Vec<(SeedRow, Decimal)>,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    let mut seen: HashSet<i64> = HashSet::new();

    for (row, price) in rows {
        let player_id = PlayerId::new(row.player_id);
        if seen.insert(row.player_id) {
            repo.upsert_player(&PlayerProfile {
                id: player_id,
                name: row.name.clone(),
                team: row.team.clone(),
                position: row.position.clone(),
            })
            .await?;
            report.players += 1;
        }

        let point = PricePoint::new(TimeMs::from_date(row.date), price);
        match repo.append_price(player_id, point).await? {
            AppendOutcome::Appended => report.appended += 1,
            AppendOutcome::OutOfOrder { last } => {
                warn!(
                    player = %player_id,
                    date = %row.date,
                    last_ms = last.as_ms(),
                    "Skipping seed price not after stored history"
                );
                report.skipped += 1;
            }
            AppendOutcome::UnknownPlayer => {
                warn!(player = %player_id, date = %row.date, "Skipping seed price for missing player");
                report.skipped += 1;
            }
        }
    }

    Ok(report)
}
