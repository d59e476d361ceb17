//! # Domain Models
//!
//! Canonical domain types for cached daily price data.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Currency`] | A name-keyed cryptocurrency (e.g. `btc-bitcoin`) |
//! | [`DailyRecord`] | Open/high/low/close prices for one calendar day |
//! | [`PriceField`] | Selector for one of the four OHLC prices |
//! | [`DateRange`] | Closed `[start, end]` interval of calendar days |
//!
//! ## Validation
//!
//! [`DateRange`] refuses to represent a degenerate interval:
//!
//! ```rust
//! use coinstreak_core::{DateRange, ValidationError};
//!
//! let range = DateRange::parse("2020-01", "2020-03")?;
//! assert_eq!(range.day_count(), 91);
//!
//! let err = DateRange::parse("2020-02-01", "2020-01-01").unwrap_err();
//! assert!(matches!(err, ValidationError::StartAfterEnd { .. }));
//! # Ok::<(), ValidationError>(())
//! ```

mod models;
mod range;

pub use models::{iso_date, Currency, DailyRecord, PriceField};
pub use range::{parse_end_date, parse_start_date, DateRange};
pub(crate) use range::parse_iso_date;
