//! Domain primitives: TimeMs, UserId, PlayerId, Season, TradeType.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    pub fn now() -> Self {
        TimeMs(Utc::now().timestamp_millis())
    }

    pub fn as_ms(&self) -> i64 {
        self.0
    }

    /// Midnight UTC of the given calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        TimeMs(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis())
    }

    /// Calendar date (UTC) this instant falls on.
    ///
    /// Out-of-range timestamps collapse to the Unix epoch date.
    pub fn date(&self) -> NaiveDate {
        DateTime::<Utc>::from_timestamp_millis(self.0)
            .unwrap_or_default()
            .date_naive()
    }
}

/// Opaque user identifier, issued by the external auth service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: String) -> Self {
        UserId(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric player identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub i64);

impl PlayerId {
    pub fn new(id: i64) -> Self {
        PlayerId(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named, independent portfolio instance (e.g. "standard", "epl-2021").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Season(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeasonParseError {
    #[error("season must not be empty")]
    Empty,
    #[error("season must be at most {max} characters")]
    TooLong { max: usize },
    #[error("season may only contain letters, digits, '-' and '_'")]
    InvalidChar,
}

impl Season {
    pub const MAX_LEN: usize = 32;

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Season {
    type Err = SeasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SeasonParseError::Empty);
        }
        if s.len() > Self::MAX_LEN {
            return Err(SeasonParseError::TooLong { max: Self::MAX_LEN });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SeasonParseError::InvalidChar);
        }
        Ok(Season(s.to_string()))
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Buy,
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "buy",
            TradeType::Sell => "sell",
        }
    }
}

impl FromStr for TradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(TradeType::Buy),
            "sell" => Ok(TradeType::Sell),
            other => Err(format!("unknown trade type: {}", other)),
        }
    }
}

impl std::fmt::Display for TradeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_type_serialization() {
        assert_eq!(serde_json::to_string(&TradeType::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&TradeType::Sell).unwrap(), "\"sell\"");
        assert_eq!("sell".parse::<TradeType>().unwrap(), TradeType::Sell);
        assert!("hold".parse::<TradeType>().is_err());
    }

    #[test]
    fn test_season_accepts_valid_names() {
        assert_eq!("standard".parse::<Season>().unwrap().as_str(), "standard");
        assert_eq!("epl-2021".parse::<Season>().unwrap().as_str(), "epl-2021");
        assert_eq!(" cup_22 ".parse::<Season>().unwrap().as_str(), "cup_22");
    }

    #[test]
    fn test_season_rejects_invalid_names() {
        assert_eq!("".parse::<Season>(), Err(SeasonParseError::Empty));
        assert_eq!("epl 2021".parse::<Season>(), Err(SeasonParseError::InvalidChar));
        assert_eq!(
            "x".repeat(33).parse::<Season>(),
            Err(SeasonParseError::TooLong { max: 32 })
        );
    }

    #[test]
    fn test_timems_date_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2021, 8, 14).unwrap();
        let t = TimeMs::from_date(date);
        assert_eq!(t.date(), date);
        assert_eq!(TimeMs::new(t.as_ms() + 86_399_999).date(), date);
    }

    #[test]
    fn test_timems_ordering() {
        assert!(TimeMs::new(1000) < TimeMs::new(2000));
    }
}
