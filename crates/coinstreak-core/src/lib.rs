//! # Coinstreak Core
//!
//! Reconciliation and analytics for cached daily cryptocurrency prices.
//!
//! ## Overview
//!
//! - **Domain models** for currencies, daily OHLC records and date ranges
//! - **HTTP transport seam** with a reqwest client and an in-process replay client
//! - **Paged fetching** with fail-fast error classification
//! - **Record transforms** declared as a closed set of rules
//! - **Reconciliation** of requested ranges against the local warehouse
//! - **Analytics**: best increase runs and monthly averages
//! - **Export** to CSV or JSON
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`analytics`] | Increase-run detection and monthly averages |
//! | [`config`] | Remote API settings |
//! | [`domain`] | Domain models (Currency, DailyRecord, DateRange) |
//! | [`error`] | Core error types |
//! | [`export`] | CSV and JSON export |
//! | [`fetcher`] | Sequential multi-page fetching |
//! | [`http_client`] | HTTP client abstraction |
//! | [`reconciler`] | Cache-aware retrieval |
//! | [`transform`] | Raw record transform rules |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use coinstreak_core::{
//!     best_increase_runs, ApiConfig, DateRange, PriceField, Reconciler, ReqwestHttpClient,
//!     RunRanking,
//! };
//! use coinstreak_warehouse::Warehouse;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reconciler = Reconciler::new(
//!         Warehouse::open_default()?,
//!         Arc::new(ReqwestHttpClient::new()),
//!         ApiConfig::from_env(),
//!     );
//!
//!     let range = DateRange::parse("2020-01-01", "2020-01-31")?;
//!     let records = reconciler.get_data("btc-bitcoin", range).await?.into_result()?;
//!
//!     for run in best_increase_runs(&records, PriceField::Close, RunRanking::Gain) {
//!         println!("{} -> {}: +{}", run.start, run.end, run.gain);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Reconciler     │────▶│ Warehouse        │
//! └────────┬────────┘     │ (DuckDB)         │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ PagedFetcher    │────▶│ HTTP Client      │
//! │ + transforms    │     │ (reqwest/replay) │
//! └─────────────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Analytics /     │
//! │ Export          │
//! └─────────────────┘
//! ```

pub mod analytics;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod http_client;
pub mod reconciler;
pub mod transform;

// Analytics
pub use analytics::{
    best_increase_runs, monthly_averages, round_cents, round_price, IncreaseRun, MonthlyAverage,
    RunRanking,
};

// Configuration
pub use config::ApiConfig;

// Domain models
pub use domain::{iso_date, Currency, DailyRecord, DateRange, PriceField};

// Errors
pub use error::{CoreError, ValidationError};

// Export
pub use export::{export_records, output_path, ExportFormat, ExportRow};

// Fetching
pub use fetcher::{FetchError, PageParams, PagedFetcher};

// HTTP client
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReplayHttpClient,
    ReqwestHttpClient,
};

// Reconciliation
pub use reconciler::{page_params, Reconciler, Reconciliation};

// Transforms
pub use transform::{apply_rules, RawRecord, TransformRule};
