use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Serialize;

use crate::api::AppState;
use crate::domain::{Decimal, Player, PlayerId};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayersResponse {
    pub players: Vec<PlayerSummaryDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummaryDto {
    pub id: i64,
    pub name: String,
    pub team: String,
    pub position: String,
    pub current_value: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetailDto {
    #[serde(flatten)]
    pub summary: PlayerSummaryDto,
    pub value_history: Vec<PricePointDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePointDto {
    pub time_ms: i64,
    pub date: NaiveDate,
    pub amount: Decimal,
}

impl From<&Player> for PlayerSummaryDto {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.as_i64(),
            name: p.name.clone(),
            team: p.team.clone(),
            position: p.position.clone(),
            current_value: p.current_value,
        }
    }
}

pub async fn list_players(State(state): State<AppState>) -> Result<Json<PlayersResponse>, AppError> {
    let players = state.repo.list_players().await?;
    Ok(Json(PlayersResponse {
        players: players.iter().map(PlayerSummaryDto::from).collect(),
    }))
}

pub async fn get_player(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<PlayerDetailDto>, AppError> {
    let Path(id) = path?;
    let player = state
        .repo
        .get_player(PlayerId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("player {} not found", id)))?;

    let value_history = player
        .value_history
        .iter()
        .map(|p| PricePointDto {
            time_ms: p.time_ms.as_ms(),
            date: p.time_ms.date(),
            amount: p.amount,
        })
        .collect();

    Ok(Json(PlayerDetailDto {
        summary: PlayerSummaryDto::from(&player),
        value_history,
    }))
}
