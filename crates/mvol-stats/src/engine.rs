//! Statistics engine.
//!
//! All results that leave this module are rounded half-up to two decimals.
//! Composition uses the already-rounded upstream value: `variance` squares
//! the rounded standard deviation, and `beta` divides by that variance.

use mvol_core::{round2, MetricStats};
use serde::{Deserialize, Serialize};

/// Arithmetic mean. Empty series → `0`.
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

/// Mean with a second-pass correction term, which keeps the result stable
/// for series with a large common offset.
fn corrected_mean(series: &[f64]) -> f64 {
    let n = series.len() as f64;
    let m = mean(series);
    let correction: f64 = series.iter().map(|x| x - m).sum();
    m + correction / n
}

/// Population standard deviation (divides by N), rounded to two decimals.
/// Empty series → `0`.
pub fn std_dev(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }

    let n = series.len() as f64;
    let m = corrected_mean(series);
    let (sum_sq, sum_dev) = series.iter().fold((0.0, 0.0), |(sq, dev), x| {
        let d = x - m;
        (sq + d * d, dev + d)
    });
    let population_variance = ((sum_sq - sum_dev * sum_dev / n) / n).max(0.0);

    round2(population_variance.sqrt())
}

/// Coefficient of variation on a percentage scale: `round(std_dev / mean * 100, 2)`.
///
/// A zero mean yields `0`, which callers treat as "no signal".
pub fn coefficient_of_variation(std_dev: f64, mean: f64) -> f64 {
    if mean == 0.0 {
        return 0.0;
    }
    (std_dev / mean * 10_000.0 + 0.5).floor() / 100.0
}

/// Variance defined as the square of the *rounded* standard deviation.
///
/// This is lossy compared to true variance. It exists so that `beta` stays
/// numerically identical to previously persisted values; new call sites
/// should not depend on it.
pub fn variance(series: &[f64]) -> f64 {
    let sd = std_dev(series);
    sd * sd
}

/// Population covariance (divides by N) of two aligned series.
///
/// Empty or mismatched-length inputs yield `0`.
pub fn covariance(national: &[f64], market: &[f64]) -> f64 {
    if national.is_empty() || market.is_empty() || national.len() != market.len() {
        return 0.0;
    }

    let national_mean = mean(national);
    let market_mean = mean(market);
    let sum: f64 = national
        .iter()
        .zip(market)
        .map(|(n, m)| (n - national_mean) * (m - market_mean))
        .sum();

    sum / market.len() as f64
}

/// Beta of a market series against its national benchmark:
/// `round(covariance / variance(national), 2)`.
///
/// A flat benchmark (variance `0`) yields `0`.
pub fn beta(national: &[f64], market: &[f64]) -> f64 {
    let national_variance = variance(national);
    if national_variance == 0.0 {
        return 0.0;
    }
    round2(covariance(national, market) / national_variance)
}

/// The derived triple for one metric family.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricSummary {
    pub std_dev: f64,
    pub cv: f64,
    pub beta: f64,
}

impl MetricSummary {
    /// Compute std-dev, CV and beta for a market series against its benchmark.
    pub fn compute(national: &[f64], market: &[f64]) -> Self {
        let sd = std_dev(market);
        Self {
            std_dev: sd,
            cv: coefficient_of_variation(sd, mean(market)),
            beta: beta(national, market),
        }
    }

    /// False when an input large enough to overflow produced `inf` or `NaN`.
    pub fn is_finite(&self) -> bool {
        self.std_dev.is_finite() && self.cv.is_finite() && self.beta.is_finite()
    }

    /// Attach the source series to form a persisted stats block.
    pub fn into_stats(self, ten_year: Vec<f64>) -> MetricStats {
        MetricStats::new(self.std_dev, self.cv, self.beta, ten_year)
    }
}
