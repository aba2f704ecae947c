pub mod auth;
pub mod health;
pub mod players;
pub mod portfolio;
pub mod transactions;

use crate::config::Config;
use crate::db::Repository;
use crate::domain::Season;
use crate::error::AppError;
use crate::orchestration::Broker;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub broker: Arc<Broker>,
    pub config: Config,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config) -> Self {
        let broker = Arc::new(Broker::new(repo.clone(), config.starting_balance));
        Self {
            repo,
            broker,
            config,
        }
    }

    /// Season named by a request, or the configured default when absent or blank.
    pub fn resolve_season(&self, requested: Option<&str>) -> Result<Season, AppError> {
        match requested.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s
                .parse::<Season>()
                .map_err(|e| AppError::BadRequest(format!("Invalid season: {}", e))),
            None => Ok(self.config.default_season.clone()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/players", get(players::list_players))
        .route("/players/:id", get(players::get_player))
        .route("/portfolio", get(portfolio::get_portfolio))
        .route("/portfolio/value", get(portfolio::get_portfolio_value))
        .route("/transaction", get(transactions::get_transactions))
        .route("/transaction/buy", post(transactions::buy))
        .route("/transaction/sell", post(transactions::sell))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
