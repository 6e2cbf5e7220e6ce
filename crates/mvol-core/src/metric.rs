//! Metric families, statistic kinds, and the nine ranking categories.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A metric family. Each family has its own ten-year sequence and its own
/// derived std-dev / CV / beta triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    Vacancy,
    RentGrowth,
    CapRate,
}

impl Metric {
    /// All families, in the order they appear inside a market record.
    pub const ALL: [Metric; 3] = [Metric::Vacancy, Metric::RentGrowth, Metric::CapRate];

    /// Human-readable label used in both text stores.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Vacancy => "Vacancy",
            Self::RentGrowth => "Rent Growth",
            Self::CapRate => "Cap Rate",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "vacancy" | "vac" => Ok(Self::Vacancy),
            "rentgrowth" | "rg" => Ok(Self::RentGrowth),
            "caprate" | "cap" => Ok(Self::CapRate),
            _ => Err(CoreError::UnknownMetric(s.to_string())),
        }
    }
}

/// A derived statistic kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Statistic {
    StdDev,
    Cv,
    Beta,
}

impl Statistic {
    pub const ALL: [Statistic; 3] = [Statistic::StdDev, Statistic::Cv, Statistic::Beta];

    /// Label used as the ranking-line prefix.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StdDev => "Standard Deviation",
            Self::Cv => "CV",
            Self::Beta => "Beta",
        }
    }

    /// Short label used in table headers.
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::StdDev => "SD",
            Self::Cv => "CV",
            Self::Beta => "Beta",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the nine ranking categories: a (statistic, metric) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub statistic: Statistic,
    pub metric: Metric,
}

impl Category {
    /// The nine categories in the canonical on-disk line order.
    pub const ALL: [Category; 9] = [
        Category::new(Statistic::Cv, Metric::Vacancy),
        Category::new(Statistic::Cv, Metric::RentGrowth),
        Category::new(Statistic::Cv, Metric::CapRate),
        Category::new(Statistic::Beta, Metric::Vacancy),
        Category::new(Statistic::Beta, Metric::RentGrowth),
        Category::new(Statistic::Beta, Metric::CapRate),
        Category::new(Statistic::StdDev, Metric::CapRate),
        Category::new(Statistic::StdDev, Metric::RentGrowth),
        Category::new(Statistic::StdDev, Metric::Vacancy),
    ];

    pub const fn new(statistic: Statistic, metric: Metric) -> Self {
        Self { statistic, metric }
    }

    /// Position of this category in [`Category::ALL`].
    pub fn index(&self) -> usize {
        match (self.statistic, self.metric) {
            (Statistic::Cv, Metric::Vacancy) => 0,
            (Statistic::Cv, Metric::RentGrowth) => 1,
            (Statistic::Cv, Metric::CapRate) => 2,
            (Statistic::Beta, Metric::Vacancy) => 3,
            (Statistic::Beta, Metric::RentGrowth) => 4,
            (Statistic::Beta, Metric::CapRate) => 5,
            (Statistic::StdDev, Metric::CapRate) => 6,
            (Statistic::StdDev, Metric::RentGrowth) => 7,
            (Statistic::StdDev, Metric::Vacancy) => 8,
        }
    }

    /// The three categories that move together when one metric family changes.
    pub fn for_metric(metric: Metric) -> [Category; 3] {
        [
            Category::new(Statistic::StdDev, metric),
            Category::new(Statistic::Cv, metric),
            Category::new(Statistic::Beta, metric),
        ]
    }

    /// Ranking-file label without the trailing colon, e.g. `CV Vacancy Rankings`.
    pub fn label(&self) -> String {
        format!("{} {} Rankings", self.statistic.label(), self.metric.label())
    }

    /// Resolve a ranking-file label (with or without the trailing colon).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_end_matches(':').trim_end();
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.statistic.label(), self.metric.label())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}
