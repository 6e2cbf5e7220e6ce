//! Volatility statistics for mvol.
//!
//! Pure numeric functions with no I/O and no state:
//! - `mean`, `std_dev` (population), `variance`, `covariance`
//! - `coefficient_of_variation` and `beta` versus a national benchmark
//! - `MetricSummary`: the std-dev / CV / beta triple for one metric family
//!
//! Degenerate inputs (empty series, zero mean, flat benchmark) resolve to `0`
//! rather than an error.

pub mod engine;

pub use engine::{beta, coefficient_of_variation, covariance, mean, std_dev, variance, MetricSummary};
