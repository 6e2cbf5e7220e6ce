//! National benchmark sequences.

use crate::error::Result;
use crate::metric::Metric;
use crate::numeric::parse_value;
use serde::{Deserialize, Serialize};

/// The three national reference sequences, aligned index-for-index with
/// calendar year.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NationalSeries {
    pub rent_growth: Vec<f64>,
    pub vacancy: Vec<f64>,
    pub cap_rate: Vec<f64>,
}

impl NationalSeries {
    pub fn new(rent_growth: Vec<f64>, vacancy: Vec<f64>, cap_rate: Vec<f64>) -> Self {
        Self {
            rent_growth,
            vacancy,
            cap_rate,
        }
    }

    /// The benchmark sequence for a metric family.
    pub fn for_metric(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Vacancy => &self.vacancy,
            Metric::RentGrowth => &self.rent_growth,
            Metric::CapRate => &self.cap_rate,
        }
    }

    /// Label that opens this metric's line in the benchmark file.
    pub fn line_label(metric: Metric) -> String {
        format!("Ten Year National {}:", metric.label())
    }

    /// Parse the benchmark file text.
    ///
    /// Each line looks like `Ten Year National Rent Growth: 1.2,3.4,...`.
    /// Lines are matched by label in any order; a missing line leaves that
    /// series empty. Blank tokens are skipped and any other unparsable token
    /// is an error.
    pub fn parse(text: &str) -> Result<Self> {
        let mut series = Self::default();

        for line in text.lines() {
            let line = line.trim();
            for metric in Metric::ALL {
                let label = Self::line_label(metric);
                if let Some(rest) = line.strip_prefix(label.as_str()) {
                    let values = rest
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(parse_value)
                        .collect::<Result<Vec<f64>>>()?;
                    match metric {
                        Metric::Vacancy => series.vacancy = values,
                        Metric::RentGrowth => series.rent_growth = values,
                        Metric::CapRate => series.cap_rate = values,
                    }
                }
            }
        }

        Ok(series)
    }

    /// Whether every family has at least one value.
    pub fn is_complete(&self) -> bool {
        Metric::ALL.iter().all(|m| !self.for_metric(*m).is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_three_lines() {
        let text = "Ten Year National Rent Growth: 1,2,3\n\
                    Ten Year National Vacancy: 5.5, 6.5, 7.5\n\
                    Ten Year National Cap Rate: 4,4.25,4.5\n";
        let national = NationalSeries::parse(text).unwrap();
        assert_eq!(national.rent_growth, vec![1.0, 2.0, 3.0]);
        assert_eq!(national.for_metric(Metric::Vacancy), &[5.5, 6.5, 7.5]);
        assert_eq!(national.cap_rate, vec![4.0, 4.25, 4.5]);
        assert!(national.is_complete());
    }

    #[test]
    fn test_parse_any_order_and_missing_line() {
        let text = "Ten Year National Cap Rate: 4,5\nTen Year National Rent Growth: 1,2,\n";
        let national = NationalSeries::parse(text).unwrap();
        assert_eq!(national.cap_rate, vec![4.0, 5.0]);
        assert_eq!(national.rent_growth, vec![1.0, 2.0]);
        assert!(national.vacancy.is_empty());
        assert!(!national.is_complete());
    }

    #[test]
    fn test_parse_rejects_bad_token() {
        let text = "Ten Year National Vacancy: 1,two,3\n";
        assert!(NationalSeries::parse(text).is_err());
    }
}
