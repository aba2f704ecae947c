use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::auth::AuthUser;
use crate::api::portfolio::PortfolioDto;
use crate::api::AppState;
use crate::db::TransactionFilter;
use crate::domain::{Decimal, PlayerId, Transaction, TradeType};
use crate::error::AppError;
use crate::orchestration::TradeReceipt;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub player_id: i64,
    pub amount: i64,
    pub season: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeResponse {
    pub transaction: TransactionDto,
    pub portfolio: PortfolioDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsQuery {
    pub season: Option<String>,
    pub player_id: Option<i64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: String,
    pub season: String,
    pub player_id: i64,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub unit_price: Decimal,
    pub amount: i64,
    pub total: Decimal,
    pub time_ms: i64,
}

impl From<&Transaction> for TransactionDto {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id.clone(),
            season: t.season.to_string(),
            player_id: t.player_id.as_i64(),
            trade_type: t.trade_type,
            unit_price: t.unit_price,
            amount: t.amount,
            total: t.total(),
            time_ms: t.time_ms.as_ms(),
        }
    }
}

impl From<TradeReceipt> for TradeResponse {
    fn from(receipt: TradeReceipt) -> Self {
        Self {
            transaction: TransactionDto::from(&receipt.transaction),
            portfolio: PortfolioDto::from(&receipt.portfolio),
        }
    }
}

pub async fn buy(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<TradeResponse>, AppError> {
    let Json(req) = payload?;
    let season = state.resolve_season(req.season.as_deref())?;
    let receipt = state
        .broker
        .buy(&user, &season, PlayerId::new(req.player_id), req.amount)
        .await?;
    Ok(Json(receipt.into()))
}

pub async fn sell(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<Json<TradeResponse>, AppError> {
    let Json(req) = payload?;
    let season = state.resolve_season(req.season.as_deref())?;
    let receipt = state
        .broker
        .sell(&user, &season, PlayerId::new(req.player_id), req.amount)
        .await?;
    Ok(Json(receipt.into()))
}

/// Trade history, newest first. Without `season` every season is included.
pub async fn get_transactions(
    AuthUser(user): AuthUser,
    query: Result<Query<TransactionsQuery>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let Query(params) = query?;
    let season = match params.season.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Some(state.resolve_season(Some(s))?),
        _ => None,
    };

    let max = state.config.transaction_history_limit;
    let limit = match params.limit {
        Some(0) => return Err(AppError::BadRequest("limit must be positive".to_string())),
        Some(n) => n.min(max),
        None => max,
    };

    let filter = TransactionFilter {
        season,
        player_id: params.player_id.map(PlayerId::new),
        limit: Some(limit),
    };
    let transactions = state.repo.query_transactions(&user, &filter).await?;

    Ok(Json(TransactionsResponse {
        transactions: transactions.iter().map(TransactionDto::from).collect(),
    }))
}
