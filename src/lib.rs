pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod seed;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Decimal, Player, PlayerId, Portfolio, PortfolioAsset, PricePoint, Season, TimeMs, TradeType,
    Transaction, UserId,
};
pub use error::AppError;
pub use orchestration::Broker;
