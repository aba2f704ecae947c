use crate::domain::{Decimal, Season};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    /// Cash a portfolio starts with when first accessed.
    pub starting_balance: Decimal,
    pub default_season: Season,
    pub session_cookie: String,
    pub transaction_history_limit: u32,
    pub seed_players_path: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let starting_balance = env_map
            .get("STARTING_BALANCE")
            .map(|s| s.as_str())
            .unwrap_or("1000000000")
            .parse::<Decimal>()
            .ok()
            .filter(|b| !b.is_negative())
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "STARTING_BALANCE".to_string(),
                    "must be a non-negative decimal".to_string(),
                )
            })?;

        let default_season = env_map
            .get("DEFAULT_SEASON")
            .map(|s| s.as_str())
            .unwrap_or("standard")
            .parse::<Season>()
            .map_err(|e| ConfigError::InvalidValue("DEFAULT_SEASON".to_string(), e.to_string()))?;

        let session_cookie = env_map
            .get("SESSION_COOKIE")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "token".to_string());
        if session_cookie.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SESSION_COOKIE".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let transaction_history_limit = env_map
            .get("TRANSACTION_HISTORY_LIMIT")
            .map(|s| s.as_str())
            .unwrap_or("100")
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TRANSACTION_HISTORY_LIMIT".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let seed_players_path = env_map
            .get("SEED_PLAYERS_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Config {
            port,
            database_path,
            starting_balance,
            default_season,
            session_cookie,
            transaction_history_limit,
            seed_players_path,
        })
    }
}
