use coinstreak_warehouse::WarehouseError;
use thiserror::Error;

use crate::fetcher::FetchError;

/// Input errors, raised before any I/O takes place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Incorrect date format. Should be YYYY-MM-DD or YYYY-MM: '{value}'")]
    InvalidDateFormat { value: String },

    #[error("The start date must be earlier than the end date! ({start} is after {end})")]
    StartAfterEnd { start: String, end: String },

    #[error("unknown export format '{value}', expected one of csv, json")]
    UnknownExportFormat { value: String },

    #[error("unknown price field '{value}', expected one of open, close, high, low")]
    UnknownPriceField { value: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(
        "could not resolve currency '{name}': {source}. \
         Check that the coin identifier is correct (e.g. btc-bitcoin)"
    )]
    CurrencyNotFound {
        name: String,
        #[source]
        source: FetchError,
    },

    #[error("currency lookup for '{name}' returned no usable id")]
    CurrencyPayload { name: String },

    #[error("no records for '{currency}' between {start} and {end}")]
    NoData {
        currency: String,
        start: String,
        end: String,
    },

    #[error("stored record has an unreadable date: '{value}'")]
    CorruptRecord { value: String },

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
