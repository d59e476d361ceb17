use std::fmt::{Display, Formatter};
use std::str::FromStr;

use coinstreak_warehouse::{CurrencyRow, DailyRecordRow};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::range::parse_iso_date;
use crate::{CoreError, ValidationError};

/// A cryptocurrency known to the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: i64,
    pub name: String,
}

impl From<CurrencyRow> for Currency {
    fn from(row: CurrencyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// OHLC prices of one currency for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DailyRecord {
    pub fn price(&self, field: PriceField) -> f64 {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
        }
    }
}

impl TryFrom<DailyRecordRow> for DailyRecord {
    type Error = CoreError;

    fn try_from(row: DailyRecordRow) -> Result<Self, Self::Error> {
        let date = parse_iso_date(&row.date).ok_or(CoreError::CorruptRecord { value: row.date })?;
        Ok(Self {
            date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
        })
    }
}

/// Which of the four daily prices an analysis or export reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl PriceField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
        }
    }
}

impl Display for PriceField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceField {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            "close" => Ok(Self::Close),
            _ => Err(ValidationError::UnknownPriceField {
                value: value.to_owned(),
            }),
        }
    }
}

/// `YYYY-MM-DD` rendering used for storage keys, API parameters and exports.
pub fn iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}
