//! mvol - Entry Point
//!
//! Without a subcommand the interactive menu runs on stdin/stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use mvol_app::{report, AppConfig, Menu, NewMarket, Orchestrator};
use mvol_core::{parse_series, Metric};
use std::io::{self, Write};
use tracing::info;

/// Market volatility tracker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via MVOL_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive menu (default)
    Menu,
    /// Add a market from three comma-separated ten-year series
    Add {
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        vacancy: String,
        #[arg(long, allow_hyphen_values = true)]
        rent_growth: String,
        #[arg(long, allow_hyphen_values = true)]
        cap_rate: String,
    },
    /// Show a market's rank in each of the nine lists
    View { name: String },
    /// Replace one metric family of an existing market
    Update {
        name: String,
        /// vacancy, rent-growth or cap-rate
        #[arg(long)]
        metric: Metric,
        #[arg(long, allow_hyphen_values = true)]
        series: String,
        /// National series for this metric; defaults to the benchmark file
        #[arg(long, allow_hyphen_values = true)]
        national: Option<String>,
    },
    /// Compare two markets side by side
    Compare { first: String, second: String },
    /// Remove a market from both stores
    Remove { name: String },
    /// Print the rankings table
    Rankings,
    /// Print every market as one JSON object per line
    Export,
    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Determine config path: CLI arg > MVOL_CONFIG env var > default
    let config_path = AppConfig::resolve_path(args.config);
    let config = AppConfig::load(&config_path)?;

    mvol_telemetry::init_logging(&config.telemetry.log_level)?;
    info!(
        config_path = %config_path,
        data_dir = %config.storage.data_dir.display(),
        "Starting mvol v{}",
        env!("CARGO_PKG_VERSION")
    );

    let command = args.command.unwrap_or(Command::Menu);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Command::Config = command {
        write!(out, "{}", config.to_toml()?)?;
        return Ok(());
    }

    let mut orchestrator = Orchestrator::open(&config.storage)?;

    match command {
        Command::Menu => {
            Menu::new(&mut orchestrator, io::stdin().lock(), out).run()?;
        }
        Command::Add {
            name,
            vacancy,
            rent_growth,
            cap_rate,
        } => {
            let record = orchestrator.add_market(NewMarket {
                name,
                vacancy: parse_series(&vacancy)?,
                rent_growth: parse_series(&rent_growth)?,
                cap_rate: parse_series(&cap_rate)?,
            })?;
            write!(out, "{}", report::render_added(&record))?;
        }
        Command::View { name } => {
            let view = orchestrator.view_market(&name)?;
            write!(out, "{}", report::render_view(&view))?;
        }
        Command::Update {
            name,
            metric,
            series,
            national,
        } => {
            let national = national.as_deref().map(parse_series).transpose()?;
            let record = orchestrator.update_metric(&name, metric, parse_series(&series)?, national)?;
            let stats = record.family(metric);
            writeln!(
                out,
                "Updated {} for {}: Standard Deviation: {:.2}, CV: {:.2}, Beta: {:.2}",
                metric, record.name, stats.std_dev, stats.cv, stats.beta
            )?;
        }
        Command::Compare { first, second } => {
            let comparison = orchestrator.compare(&first, &second)?;
            write!(out, "{}", report::render_comparison(&comparison))?;
        }
        Command::Remove { name } => {
            orchestrator.remove_market(&name)?;
            writeln!(out, "Removed {}.", name.trim())?;
        }
        Command::Rankings => {
            let table = orchestrator.extract_rankings()?;
            write!(out, "{}", report::render_ranking_table(&table))?;
        }
        Command::Export => {
            for record in orchestrator.export_markets()? {
                writeln!(out, "{}", serde_json::to_string(&record)?)?;
            }
        }
        Command::Config => {}
    }

    Ok(())
}
