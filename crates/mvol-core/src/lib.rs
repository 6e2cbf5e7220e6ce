//! Core domain types for the mvol market risk tracker.
//!
//! This crate provides the vocabulary shared by every other crate:
//! - `Metric`, `Statistic`, `Category`: the 3 × 3 grid of ranking categories
//! - `MarketRecord`, `MetricStats`: the canonical per-market record
//! - `NationalSeries`: the national benchmark sequences
//! - `round2`, `parse_series`, `format_value`: numeric text helpers
//! - `Ordinal`: 1-based rank positions rendered as `1st`, `2nd`, ...

pub mod error;
pub mod market;
pub mod metric;
pub mod national;
pub mod numeric;
pub mod ordinal;

pub use error::{CoreError, Result};
pub use market::{validate_market_name, MarketRecord, MetricStats};
pub use metric::{Category, Metric, Statistic};
pub use national::NationalSeries;
pub use numeric::{format_series, format_value, parse_series, parse_value, round2};
pub use ordinal::Ordinal;
