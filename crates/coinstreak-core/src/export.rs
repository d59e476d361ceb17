//! Flat per-day exports of a reconciled series.

use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::analytics::round_cents;
use crate::domain::{iso_date, DailyRecord, PriceField};
use crate::{CoreError, ValidationError};

/// Header row of CSV exports.
pub const CSV_HEADER: &str = "Date,Price ($)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl Display for ExportFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(ValidationError::UnknownExportFormat {
                value: value.to_owned(),
            }),
        }
    }
}

/// One exported day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub date: String,
    pub price: f64,
}

pub fn export_rows(records: &[DailyRecord], field: PriceField) -> Vec<ExportRow> {
    records
        .iter()
        .map(|record| ExportRow {
            date: iso_date(record.date),
            price: round_cents(record.price(field)),
        })
        .collect()
}

/// `file` up to its first `.`, with the format's extension appended.
///
/// `report.json` exported as CSV becomes `report.csv`.
pub fn output_path(file: &str, format: ExportFormat) -> PathBuf {
    let path = Path::new(file);
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file);
    let stem = name.split('.').next().unwrap_or(name);
    let stem = if stem.is_empty() { "export" } else { stem };
    path.with_file_name(format!("{stem}.{}", format.extension()))
}

/// Write `rows` to `path` in `format`.
pub fn write_rows(path: &Path, rows: &[ExportRow], format: ExportFormat) -> Result<(), CoreError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => {
            writeln!(writer, "{CSV_HEADER}")?;
            for row in rows {
                writeln!(writer, "{},{}", row.date, row.price)?;
            }
        }
        ExportFormat::Json => {
            let body = serde_json::to_string_pretty(rows)?;
            writeln!(writer, "{body}")?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Export `records` next to `file` and return the written path.
pub fn export_records(
    records: &[DailyRecord],
    field: PriceField,
    format: ExportFormat,
    file: &str,
) -> Result<PathBuf, CoreError> {
    let path = output_path(file, format);
    let rows = export_rows(records, field);
    write_rows(&path, &rows, format)?;
    tracing::info!(path = %path.display(), rows = rows.len(), %format, "exported records");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::{Date, Month};

    fn record(day: u8, close: f64) -> DailyRecord {
        DailyRecord {
            date: Date::from_calendar_date(2020, Month::January, day).expect("date"),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close,
        }
    }

    #[test]
    fn parses_known_formats_only() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert_eq!(
            "xml".parse::<ExportFormat>(),
            Err(ValidationError::UnknownExportFormat {
                value: String::from("xml")
            })
        );
    }

    #[test]
    fn extension_follows_the_format() {
        assert_eq!(output_path("test_name.json", ExportFormat::Csv), PathBuf::from("test_name.csv"));
        assert_eq!(output_path("test", ExportFormat::Json), PathBuf::from("test.json"));
        assert_eq!(output_path("a.b.c", ExportFormat::Csv), PathBuf::from("a.csv"));
        assert_eq!(
            output_path("out/prices.txt", ExportFormat::Json),
            PathBuf::from("out/prices.json")
        );
    }

    #[test]
    fn rows_are_rounded_to_cents() {
        let rows = export_rows(&[record(1, 7220.194_2)], PriceField::Close);
        assert_eq!(
            rows,
            vec![ExportRow {
                date: String::from("2020-01-01"),
                price: 7220.19
            }]
        );
    }

    #[test]
    fn csv_has_header_and_one_line_per_day() {
        let temp = tempdir().expect("tempdir");
        let file = temp.path().join("prices");
        let records = vec![record(1, 7220.19), record(2, 7000.0), record(3, 7100.5)];

        let path = export_records(&records, PriceField::Close, ExportFormat::Csv, file.to_str().expect("utf8"))
            .expect("export");

        let content = std::fs::read_to_string(path).expect("read");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Date,Price ($)");
        assert_eq!(lines[1], "2020-01-01,7220.19");
    }

    #[test]
    fn json_is_an_array_of_date_price_objects() {
        let temp = tempdir().expect("tempdir");
        let file = temp.path().join("prices.csv");
        let records = vec![record(1, 1.0), record(2, 2.0)];

        let path = export_records(&records, PriceField::High, ExportFormat::Json, file.to_str().expect("utf8"))
            .expect("export");
        assert!(path.ends_with("prices.json"));

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).expect("read")).expect("json");
        let items = parsed.as_array().expect("array");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["date"], "2020-01-01");
        assert_eq!(items[0]["price"], 2.0);
    }
}
