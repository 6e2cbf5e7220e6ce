//! Plain-text rendering of operation results.

use crate::app::{Comparison, MarketView, RankingTable};
use mvol_core::{round2, MarketRecord, Metric, Statistic};
use mvol_stats::mean;
use std::fmt::Write;

/// Width of one rankings-table column.
pub const COLUMN_WIDTH: usize = 33;

/// Shown in place of a rank when a market is missing from a list.
pub const NOT_FOUND: &str = "Not found";

/// The nine derived values of a freshly added market.
pub fn render_added(record: &MarketRecord) -> String {
    let mut out = String::new();
    for statistic in Statistic::ALL {
        for metric in Metric::ALL {
            let _ = writeln!(
                out,
                "{} {}: {:.2}",
                statistic.label(),
                metric.label(),
                record.family(metric).statistic(statistic)
            );
        }
    }
    out
}

/// A market's rank in every list.
pub fn render_view(view: &MarketView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Market: {}", view.record.name);
    let _ = writeln!(out, "____________________");
    for (category, rank) in &view.ranks {
        let rank = rank.map_or_else(|| NOT_FOUND.to_string(), |r| r.to_string());
        let _ = writeln!(out, "Ranking for {category}: {rank}");
    }
    out
}

fn stat_line(out: &mut String, heading: &str, value: impl Fn(Metric) -> f64) {
    let values: Vec<String> = Metric::ALL
        .iter()
        .map(|m| format!("{}: {:.2}", m.label(), value(*m)))
        .collect();
    let _ = writeln!(out, "{heading}:  {}", values.join(" "));
}

fn render_market_block(out: &mut String, record: &MarketRecord) {
    let _ = writeln!(out, "Market: {}", record.name);
    let _ = writeln!(out, "-----------------------------");
    stat_line(out, "Standard Deviation of", |m| record.family(m).std_dev);
    stat_line(out, "Coefficient of variation of", |m| record.family(m).cv);
    stat_line(out, "Beta compared to national index of", |m| record.family(m).beta);
    stat_line(out, "Ten year average of", |m| round2(mean(&record.family(m).ten_year)));
}

/// Two market blocks separated by a blank line.
pub fn render_comparison(comparison: &Comparison) -> String {
    let mut out = String::new();
    render_market_block(&mut out, &comparison.first);
    out.push('\n');
    render_market_block(&mut out, &comparison.second);
    out
}

/// Fixed-width table, one column per category, one row per rank.
pub fn render_ranking_table(table: &RankingTable) -> String {
    if table.is_empty() {
        return "No ranking data available.\n".to_string();
    }

    let mut out = String::new();
    let header: Vec<String> = table
        .columns
        .iter()
        .map(|c| {
            let label = format!("{} {}", c.statistic.short_label(), c.metric.label());
            format!("{label:<COLUMN_WIDTH$}")
        })
        .collect();
    let _ = writeln!(out, "{}", header.join(" ").trim_end());
    let _ = writeln!(out, "{}", "-".repeat((COLUMN_WIDTH + 1) * table.columns.len() - 1));

    for (i, row) in table.rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|entry| {
                let cell = if entry.raw_value().is_empty() {
                    format!("{}. {}", i + 1, entry.name())
                } else {
                    format!("{}. {} ({})", i + 1, entry.name(), entry.raw_value())
                };
                format!("{cell:<COLUMN_WIDTH$}")
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join(" ").trim_end());
    }
    out
}
