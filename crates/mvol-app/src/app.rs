//! Orchestrator.
//!
//! Composes the statistics engine, the market store and the ranking index
//! into the user-level operations. It is the only place that knows which
//! ranking lists move together: all nine on add and remove, the three of one
//! metric family on update. Every operation re-reads both stores; nothing is
//! cached between calls.

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use mvol_core::{
    round2, validate_market_name, Category, MarketRecord, Metric, MetricStats, NationalSeries,
    Ordinal, Statistic,
};
use mvol_stats::{mean, MetricSummary};
use mvol_store::{load_national, Commit, Ledger, RankingEntry};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Input for a new market: one ten-year sequence per metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMarket {
    pub name: String,
    pub vacancy: Vec<f64>,
    pub rent_growth: Vec<f64>,
    pub cap_rate: Vec<f64>,
}

impl NewMarket {
    fn series(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Vacancy => &self.vacancy,
            Metric::RentGrowth => &self.rent_growth,
            Metric::CapRate => &self.cap_rate,
        }
    }
}

/// A market record together with its rank in each of the nine lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketView {
    pub record: MarketRecord,
    /// `None` when the market is missing from that list.
    pub ranks: Vec<(Category, Option<Ordinal>)>,
}

impl MarketView {
    pub fn rank(&self, category: Category) -> Option<Ordinal> {
        self.ranks
            .iter()
            .find(|(c, _)| *c == category)
            .and_then(|(_, rank)| *rank)
    }
}

/// Two markets side by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub first: MarketRecord,
    pub second: MarketRecord,
}

/// Column order of the rankings table.
pub const TABLE_COLUMNS: [Category; 9] = [
    Category::new(Statistic::StdDev, Metric::CapRate),
    Category::new(Statistic::StdDev, Metric::RentGrowth),
    Category::new(Statistic::StdDev, Metric::Vacancy),
    Category::new(Statistic::Beta, Metric::CapRate),
    Category::new(Statistic::Beta, Metric::RentGrowth),
    Category::new(Statistic::Beta, Metric::Vacancy),
    Category::new(Statistic::Cv, Metric::CapRate),
    Category::new(Statistic::Cv, Metric::RentGrowth),
    Category::new(Statistic::Cv, Metric::Vacancy),
];

/// The nine lists joined by row index.
///
/// Rows stop at the shortest list; longer lists are truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingTable {
    pub columns: Vec<Category>,
    pub rows: Vec<Vec<RankingEntry>>,
}

impl RankingTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Std-dev, CV and beta for one family, rejecting values the market file
/// cannot hold.
fn summarize(metric: Metric, national: &[f64], series: &[f64]) -> AppResult<MetricSummary> {
    if series.iter().chain(national).any(|v| !v.is_finite()) {
        return Err(AppError::validation(format!("{metric} values must be finite numbers.")));
    }
    let summary = MetricSummary::compute(national, series);
    if !summary.is_finite() {
        return Err(AppError::validation(format!(
            "{metric} values are too large to compute statistics."
        )));
    }
    Ok(summary)
}

pub struct Orchestrator {
    ledger: Ledger,
    national_path: PathBuf,
}

impl Orchestrator {
    /// Open both stores under the configured data directory.
    ///
    /// Finishes any commit interrupted by a previous crash.
    pub fn open(storage: &StorageConfig) -> AppResult<Self> {
        let ledger = Ledger::open(storage.markets_path(), storage.rankings_path())?;
        info!(
            markets = %ledger.markets().path().display(),
            rankings = %ledger.rankings().path().display(),
            "Stores opened"
        );
        Ok(Self {
            ledger,
            national_path: storage.national_path(),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Current national benchmark sequences.
    pub fn national(&self) -> AppResult<NationalSeries> {
        Ok(load_national(&self.national_path)?)
    }

    /// Add a market: compute all nine values, rank it everywhere, persist.
    pub fn add_market(&mut self, input: NewMarket) -> AppResult<MarketRecord> {
        let name = validate_market_name(&input.name)?;

        if Metric::ALL.iter().any(|m| input.series(*m).is_empty()) {
            return Err(AppError::validation("Each metric requires at least one numeric value."));
        }
        let len = input.rent_growth.len();
        if input.vacancy.len() != len || input.cap_rate.len() != len {
            return Err(AppError::validation(
                "Rent Growth, Vacancy, and Cap Rate lists must have the same number of entries.",
            ));
        }

        let national = self.national()?;
        if !national.is_complete() {
            return Err(AppError::validation("National data is missing one or more metric lists."));
        }
        if Metric::ALL
            .iter()
            .any(|m| national.for_metric(*m).len() != input.series(*m).len())
        {
            return Err(AppError::validation(
                "National data length must match market data length for each metric.",
            ));
        }

        let mut table = self.ledger.markets().load_table()?;
        if table.contains(&name) {
            return Err(AppError::validation(format!("Market {name:?} already exists.")));
        }

        let stats = |metric: Metric| -> AppResult<MetricStats> {
            let series = input.series(metric);
            Ok(summarize(metric, national.for_metric(metric), series)?.into_stats(series.to_vec()))
        };
        let record = MarketRecord::new(
            name,
            stats(Metric::Vacancy)?,
            stats(Metric::RentGrowth)?,
            stats(Metric::CapRate)?,
        );

        let mut book = self.ledger.rankings().load_tolerant()?;
        for category in Category::ALL {
            book.get_mut(category)
                .upsert_and_sort(&record.name, record.value(category));
        }
        table.append(&record);

        self.ledger
            .commit(Commit::new().with_rankings(book).with_markets(table))?;
        info!(market = %record.name, years = len, "Market added");
        Ok(record)
    }

    /// Replace one metric family of an existing market.
    ///
    /// `national` overrides the benchmark file for this call. Only the three
    /// ranking lists of `metric` are touched.
    pub fn update_metric(
        &mut self,
        name: &str,
        metric: Metric,
        series: Vec<f64>,
        national: Option<Vec<f64>>,
    ) -> AppResult<MarketRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Market name cannot be empty."));
        }

        let mut table = self.ledger.markets().load_table()?;
        let mut record = table
            .find(name)
            .ok_or_else(|| AppError::not_found("Market not found"))?;

        let national = match national {
            Some(series) => series,
            None => self.national()?.for_metric(metric).to_vec(),
        };
        if series.is_empty() || national.is_empty() {
            return Err(AppError::validation(
                "Both market and national lists must have at least one value.",
            ));
        }
        if series.len() != national.len() {
            return Err(AppError::validation(
                "Market and national lists must have the same number of entries.",
            ));
        }

        let categories = Category::for_metric(metric);
        let mut book = self.ledger.rankings().load_requiring(&categories)?;

        let summary = summarize(metric, &national, &series)?;
        record.replace_family(metric, summary.into_stats(series));
        for category in categories {
            book.get_mut(category)
                .upsert_and_sort(&record.name, record.value(category));
        }
        table.replace(&record);

        self.ledger
            .commit(Commit::new().with_rankings(book).with_markets(table))?;
        info!(
            market = %record.name,
            metric = %metric,
            std_dev = summary.std_dev,
            cv = summary.cv,
            beta = summary.beta,
            "Metric updated"
        );
        Ok(record)
    }

    /// Remove a market from the market file and from all nine lists.
    ///
    /// Fails without writing if any ranking category is missing.
    pub fn remove_market(&mut self, name: &str) -> AppResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Market name cannot be empty."));
        }

        let mut book = self.ledger.rankings().load_all()?;
        let mut table = self.ledger.markets().load_table()?;

        let lines = table.remove(name);
        let entries = book.remove_market(name);
        if lines == 0 && entries == 0 {
            return Err(AppError::not_found("Market not found"));
        }

        self.ledger
            .commit(Commit::new().with_rankings(book).with_markets(table))?;
        info!(market = %name, lines, entries, "Market removed");
        Ok(())
    }

    /// Look up a market and its rank in every list.
    pub fn view_market(&self, name: &str) -> AppResult<MarketView> {
        let record = self.find_market(name)?;
        let book = self.ledger.rankings().load_all()?;

        let ranks = Category::ALL
            .into_iter()
            .map(|c| (c, book.rank(&record.name, c)))
            .collect();
        debug!(market = %record.name, "Market viewed");
        Ok(MarketView { record, ranks })
    }

    /// Look up two markets for a side-by-side view.
    pub fn compare(&self, first: &str, second: &str) -> AppResult<Comparison> {
        let (first, second) = (first.trim(), second.trim());
        if first.is_empty() || second.is_empty() {
            return Err(AppError::validation("Market names cannot be empty."));
        }

        let table = self.ledger.markets().load_table()?;
        match (table.find(first), table.find(second)) {
            (Some(first), Some(second)) => Ok(Comparison { first, second }),
            (None, None) => Err(AppError::not_found("Markets not found")),
            (None, Some(_)) => Err(AppError::not_found(format!("Market 1 not found: {first}"))),
            (Some(_), None) => Err(AppError::not_found(format!("Market 2 not found: {second}"))),
        }
    }

    /// Mean of one family's ten-year sequence, rounded to two decimals.
    pub fn market_average(&self, name: &str, metric: Metric) -> AppResult<f64> {
        let record = self.find_market(name)?;
        Ok(round2(mean(&record.family(metric).ten_year)))
    }

    /// Join the nine lists into a table, truncated to the shortest list.
    pub fn extract_rankings(&self) -> AppResult<RankingTable> {
        let book = self.ledger.rankings().load_all()?;
        let row_count = TABLE_COLUMNS
            .iter()
            .map(|c| book.get(*c).len())
            .min()
            .unwrap_or(0);

        let rows = (0..row_count)
            .map(|i| {
                TABLE_COLUMNS
                    .iter()
                    .map(|c| book.get(*c).entries()[i].clone())
                    .collect()
            })
            .collect();

        Ok(RankingTable {
            columns: TABLE_COLUMNS.to_vec(),
            rows,
        })
    }

    /// Every parseable market record, in file order.
    pub fn export_markets(&self) -> AppResult<Vec<MarketRecord>> {
        Ok(self.ledger.markets().list()?)
    }

    /// Look up one market by exact (trimmed) name.
    pub fn find_market(&self, name: &str) -> AppResult<MarketRecord> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Market name cannot be empty."));
        }
        self.ledger
            .markets()
            .find_by_name(name)?
            .ok_or_else(|| AppError::not_found("Market not found"))
    }
}
