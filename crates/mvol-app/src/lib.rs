//! mvol: market volatility tracker.
//!
//! Tracks vacancy, rent growth and cap rate series per market, derives
//! std-dev / CV / beta, and keeps two text stores in step:
//! - the market file with one full record per market
//! - the ranking file with nine sorted category lists
//!
//! All writes go through [`Orchestrator`], which commits both files through
//! the store ledger.

pub mod app;
pub mod config;
pub mod error;
pub mod menu;
pub mod report;

pub use app::{Comparison, MarketView, NewMarket, Orchestrator, RankingTable};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use menu::Menu;
