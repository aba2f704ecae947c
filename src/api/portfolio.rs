use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::api::AppState;
use crate::domain::{Decimal, Portfolio};
use crate::engine::ValuePoint;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    pub season: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDto {
    pub user_id: String,
    pub season: String,
    pub balance: Decimal,
    pub assets: Vec<AssetDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDto {
    pub player_id: i64,
    pub amount: i64,
    pub average_value: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioValueResponse {
    pub season: String,
    pub balance: Decimal,
    pub history: Vec<ValuePoint>,
}

impl From<&Portfolio> for PortfolioDto {
    fn from(p: &Portfolio) -> Self {
        Self {
            user_id: p.user_id.to_string(),
            season: p.season.to_string(),
            balance: p.balance,
            assets: p
                .assets
                .iter()
                .map(|a| AssetDto {
                    player_id: a.player_id.as_i64(),
                    amount: a.amount,
                    average_value: a.average_value,
                })
                .collect(),
        }
    }
}

pub async fn get_portfolio(
    AuthUser(user): AuthUser,
    query: Result<Query<SeasonQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<PortfolioDto>, AppError> {
    let Query(params) = query?;
    let season = state.resolve_season(params.season.as_deref())?;
    let portfolio = state.broker.portfolio(&user, &season).await?;
    Ok(Json(PortfolioDto::from(&portfolio)))
}

pub async fn get_portfolio_value(
    AuthUser(user): AuthUser,
    query: Result<Query<SeasonQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<PortfolioValueResponse>, AppError> {
    let Query(params) = query?;
    let season = state.resolve_season(params.season.as_deref())?;
    let valuation = state.broker.valuation(&user, &season).await?;

    Ok(Json(PortfolioValueResponse {
        season: season.to_string(),
        balance: valuation.portfolio.balance,
        history: valuation.history,
    }))
}
