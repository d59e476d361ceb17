mod average_price;
mod consecutive_increase;
mod export;

use std::sync::Arc;

use coinstreak_core::{
    iso_date, ApiConfig, CoreError, DailyRecord, DateRange, ExportFormat, HttpClient, Reconciler,
    RunRanking, ValidationError,
};
use coinstreak_warehouse::{Warehouse, WarehouseConfig};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// Rendered result of a command: a human-readable text and a JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReport {
    pub text: String,
    pub data: Value,
}

/// A command with every argument validated.
enum Plan {
    ConsecutiveIncrease(RunRanking),
    AveragePriceByMonth,
    Export { format: ExportFormat, file: String },
}

impl Plan {
    fn from_command(command: &Command) -> Result<Self, ValidationError> {
        Ok(match command {
            Command::ConsecutiveIncrease(args) => Self::ConsecutiveIncrease(args.rank_by.into()),
            Command::AveragePriceByMonth => Self::AveragePriceByMonth,
            Command::Export(args) => Self::Export {
                format: args.format.parse()?,
                file: args.file.clone(),
            },
        })
    }
}

/// Validate input, reconcile the requested range and run the command.
///
/// Every argument is checked before the warehouse is opened or a request is
/// sent.
pub async fn run(cli: &Cli, client: Arc<dyn HttpClient>) -> Result<CommandReport, CliError> {
    let range = DateRange::parse(&cli.start_date, &cli.end_date)?;
    let plan = Plan::from_command(&cli.command)?;

    let warehouse = match &cli.db_path {
        Some(path) => Warehouse::open(WarehouseConfig::with_db_path(path))?,
        None => Warehouse::open_default()?,
    };
    let mut config = ApiConfig::from_env();
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms);
    }

    let reconciler = Reconciler::new(warehouse, client, config);
    let records = load_records(&reconciler, &cli.coin, range).await?;

    match plan {
        Plan::ConsecutiveIncrease(ranking) => Ok(consecutive_increase::run(&records, cli.ohlc, ranking)),
        Plan::AveragePriceByMonth => Ok(average_price::run(&records, cli.ohlc)),
        Plan::Export { format, file } => export::run(&records, cli.ohlc, format, &file),
    }
}

async fn load_records(
    reconciler: &Reconciler,
    coin: &str,
    range: DateRange,
) -> Result<Vec<DailyRecord>, CliError> {
    let reconciliation = reconciler.get_data(coin, range).await?;
    tracing::debug!(
        currency = %reconciliation.currency.name,
        %range,
        requests = reconciliation.requests_issued,
        records = reconciliation.records.len(),
        "reconciled range"
    );

    let currency = reconciliation.currency.name.clone();
    let records = reconciliation.into_result()?;
    if records.is_empty() {
        return Err(CoreError::NoData {
            currency,
            start: iso_date(range.start()),
            end: iso_date(range.end()),
        }
        .into());
    }
    Ok(records)
}
