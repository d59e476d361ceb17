//! CLI argument definitions for coinstreak.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `consecutive-increase` | Longest price increase in the range |
//! | `average-price-by-month` | Mean price of every month in the range |
//! | `export` | Write the daily prices to a CSV or JSON file |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--start-date` | | `YYYY-MM-DD` or `YYYY-MM` |
//! | `--end-date` | | `YYYY-MM-DD` or `YYYY-MM` (last day of month) |
//! | `--coin` | `btc-bitcoin` | Coin identifier |
//! | `--ohlc` | `close` | Price field (open, high, low, close) |
//! | `--timeout-ms` | `5000` | Per-request timeout |
//! | `--db-path` | `~/.coinstreak/cache/coinstreak.duckdb` | Warehouse file |
//! | `--output` | `text` | Output format (text, json) |
//!
//! # Examples
//!
//! ```bash
//! coinstreak --start-date 2020-01-01 --end-date 2020-01-31 consecutive-increase
//! coinstreak --start-date 2020-01 --end-date 2020-03 average-price-by-month
//! coinstreak --start-date 2020-01 --end-date 2020-01 export --format csv --file prices
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use coinstreak_core::{PriceField, RunRanking};

/// Cached cryptocurrency price analytics.
#[derive(Debug, Parser)]
#[command(
    name = "coinstreak",
    author,
    version,
    about = "Cached cryptocurrency price analytics",
    long_about = "coinstreak downloads daily OHLC prices for a coin, keeps them in a local \
DuckDB warehouse and answers questions about a date range:\n\
\n\
  • longest consecutive price increase\n\
  • average price per month\n\
  • export of daily prices to CSV or JSON\n\
\n\
Only days missing from the warehouse are downloaded."
)]
pub struct Cli {
    /// First day of the range (YYYY-MM-DD, or YYYY-MM for the first day of a month).
    #[arg(long)]
    pub start_date: String,

    /// Last day of the range (YYYY-MM-DD, or YYYY-MM for the last day of a month).
    #[arg(long)]
    pub end_date: String,

    /// Coin identifier as known to the API.
    #[arg(long, global = true, visible_alias = "currency", default_value = "btc-bitcoin")]
    pub coin: String,

    /// Which daily price to analyse.
    #[arg(long, global = true, default_value_t = PriceField::Close)]
    pub ohlc: PriceField,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Warehouse file; defaults to `$COINSTREAK_HOME/cache/coinstreak.duckdb`.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable sentences and tables.
    Text,
    /// Single pretty-printed JSON document.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find the longest consecutive price increase in the range.
    ///
    /// When several periods tie, all of them are listed.
    ConsecutiveIncrease(ConsecutiveIncreaseArgs),

    /// Average price of every calendar month in the range.
    AveragePriceByMonth,

    /// Export daily prices of the range to a file.
    ///
    /// # Examples
    ///
    ///   coinstreak --start-date 2020-01 --end-date 2020-01 export --format json --file prices
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct ConsecutiveIncreaseArgs {
    /// Rank increases by price gain or by number of days.
    #[arg(long, value_enum, default_value_t = RankBy::Gain)]
    pub rank_by: RankBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankBy {
    Gain,
    Days,
}

impl From<RankBy> for RunRanking {
    fn from(value: RankBy) -> Self {
        match value {
            RankBy::Gain => Self::Gain,
            RankBy::Days => Self::Duration,
        }
    }
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// File format: csv or json.
    #[arg(long)]
    pub format: String,

    /// Target file name; anything after the first `.` is replaced by the format.
    #[arg(long)]
    pub file: String,
}
