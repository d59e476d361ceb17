//! Export daily prices of the reconciled range to CSV or JSON.

use coinstreak_core::{export_records, DailyRecord, ExportFormat, PriceField};
use serde_json::json;

use super::CommandReport;
use crate::error::CliError;

pub fn run(
    records: &[DailyRecord],
    field: PriceField,
    format: ExportFormat,
    file: &str,
) -> Result<CommandReport, CliError> {
    let path = export_records(records, field, format, file)?;

    Ok(CommandReport {
        text: format!("Exported {} records to {}", records.len(), path.display()),
        data: json!({
            "format": format.extension(),
            "field": field.as_str(),
            "output": path.display().to_string(),
            "rows_exported": records.len(),
        }),
    })
}
