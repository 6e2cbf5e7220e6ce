//! The canonical per-market record.
//!
//! A market is identified by its name (case-sensitive, trimmed, never empty)
//! and carries one [`MetricStats`] block per metric family. Each block is
//! replaced wholesale when its family is updated.

use crate::error::{CoreError, Result};
use crate::metric::{Category, Metric, Statistic};
use serde::{Deserialize, Serialize};

/// Derived statistics and source sequence for one metric family.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricStats {
    /// Population standard deviation, rounded to two decimals.
    pub std_dev: f64,
    /// Coefficient of variation (percentage scale), rounded to two decimals.
    pub cv: f64,
    /// Beta versus the national benchmark, rounded to two decimals.
    pub beta: f64,
    /// The ten-year sequence the three values were derived from.
    pub ten_year: Vec<f64>,
}

impl MetricStats {
    pub fn new(std_dev: f64, cv: f64, beta: f64, ten_year: Vec<f64>) -> Self {
        Self {
            std_dev,
            cv,
            beta,
            ten_year,
        }
    }

    /// The value of one statistic kind.
    pub fn statistic(&self, statistic: Statistic) -> f64 {
        match statistic {
            Statistic::StdDev => self.std_dev,
            Statistic::Cv => self.cv,
            Statistic::Beta => self.beta,
        }
    }
}

/// One market's full record as persisted in the market store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub name: String,
    pub vacancy: MetricStats,
    pub rent_growth: MetricStats,
    pub cap_rate: MetricStats,
}

impl MarketRecord {
    pub fn new(
        name: impl Into<String>,
        vacancy: MetricStats,
        rent_growth: MetricStats,
        cap_rate: MetricStats,
    ) -> Self {
        Self {
            name: name.into(),
            vacancy,
            rent_growth,
            cap_rate,
        }
    }

    /// The stats block for a metric family.
    pub fn family(&self, metric: Metric) -> &MetricStats {
        match metric {
            Metric::Vacancy => &self.vacancy,
            Metric::RentGrowth => &self.rent_growth,
            Metric::CapRate => &self.cap_rate,
        }
    }

    /// Mutable stats block for a metric family.
    pub fn family_mut(&mut self, metric: Metric) -> &mut MetricStats {
        match metric {
            Metric::Vacancy => &mut self.vacancy,
            Metric::RentGrowth => &mut self.rent_growth,
            Metric::CapRate => &mut self.cap_rate,
        }
    }

    /// Replace one family's block, leaving the other two untouched.
    pub fn replace_family(&mut self, metric: Metric, stats: MetricStats) {
        *self.family_mut(metric) = stats;
    }

    /// The value this market contributes to a ranking category.
    pub fn value(&self, category: Category) -> f64 {
        self.family(category.metric).statistic(category.statistic)
    }
}

/// Validate and normalize a market name.
///
/// Names are trimmed. They must be non-empty and must not contain the
/// characters that delimit fields in the text stores.
pub fn validate_market_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let reason = if name.is_empty() {
        Some("name cannot be empty")
    } else if name.contains(':') {
        Some("name cannot contain ':'")
    } else if name.contains('|') {
        Some("name cannot contain '|'")
    } else if name.contains(',') {
        Some("name cannot contain ','")
    } else if name.contains(" - ") {
        Some("name cannot contain \" - \"")
    } else if name.contains(['\n', '\r']) {
        Some("name cannot span lines")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(CoreError::InvalidMarketName {
            name: raw.to_string(),
            reason,
        }),
        None => Ok(name.to_string()),
    }
}
