//! Cache-aware retrieval of daily records.
//!
//! [`Reconciler::get_data`] compares the requested range with what the
//! warehouse already holds, fetches only when days are missing, stores the
//! new rows and re-reads the range. A second call with the same arguments is
//! answered from the warehouse without any request.

use std::collections::BTreeSet;
use std::sync::Arc;

use coinstreak_warehouse::{DailyRecordRow, Warehouse};
use serde_json::Value;
use time::Date;

use crate::config::ApiConfig;
use crate::domain::{iso_date, Currency, DailyRecord, DateRange};
use crate::fetcher::{FetchError, PageParams, PagedFetcher};
use crate::http_client::HttpClient;
use crate::transform::{apply_rules, currency_rules, historical_rules, RawRecord};
use crate::CoreError;

/// Outcome of one [`Reconciler::get_data`] call.
///
/// `records` is always the stored slice of the range after the call; when the
/// historical fetch failed it is returned unchanged next to `fetch_error`.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub currency: Currency,
    pub records: Vec<DailyRecord>,
    pub fetch_error: Option<FetchError>,
    pub requests_issued: usize,
}

impl Reconciliation {
    /// Records, or the fetch error if one occurred.
    pub fn into_result(self) -> Result<Vec<DailyRecord>, CoreError> {
        match self.fetch_error {
            Some(error) => Err(CoreError::Fetch(error)),
            None => Ok(self.records),
        }
    }
}

pub struct Reconciler {
    warehouse: Warehouse,
    fetcher: PagedFetcher,
    config: ApiConfig,
}

impl Reconciler {
    pub fn new(warehouse: Warehouse, client: Arc<dyn HttpClient>, config: ApiConfig) -> Self {
        let fetcher = PagedFetcher::new(client, config.timeout_ms);
        Self {
            warehouse,
            fetcher,
            config,
        }
    }

    /// Make every day of `range` available locally for `currency_name` and
    /// return the stored slice, ascending by date.
    pub async fn get_data(
        &self,
        currency_name: &str,
        range: DateRange,
    ) -> Result<Reconciliation, CoreError> {
        let (currency, mut requests_issued) = self.resolve_currency(currency_name).await?;

        let cached = self.read_range(&currency, range)?;
        let required = range.day_count();
        if cached.len() == required {
            tracing::debug!(currency = %currency.name, %range, "range fully cached");
            return Ok(Reconciliation {
                currency,
                records: cached,
                fetch_error: None,
                requests_issued,
            });
        }

        let cached_dates: BTreeSet<Date> = cached.iter().map(|record| record.date).collect();
        tracing::debug!(
            currency = %currency.name,
            %range,
            required,
            missing = required - cached_dates.len(),
            "filling gap"
        );

        let pages = page_params(range, self.config.rows_limit);
        requests_issued += pages.len();
        let url = self.config.historical_url(&currency.name);

        let fetch_error = match self.fetcher.fetch_pages(&url, &pages).await {
            Ok(mut raw) => {
                apply_rules(&mut raw, &historical_rules());
                let rows = new_rows(raw, &cached_dates, range)?;
                let stored = self.warehouse.ingest_daily_records(currency.id, &rows)?;
                tracing::info!(currency = %currency.name, %range, stored, "stored fetched records");
                None
            }
            Err(error) => Some(error),
        };

        let records = self.read_range(&currency, range)?;
        Ok(Reconciliation {
            currency,
            records,
            fetch_error,
            requests_issued,
        })
    }

    /// Find a currency by name, looking it up remotely and storing it the
    /// first time it is seen. Returns the number of requests issued.
    ///
    /// The stored name is the identifier reported by the API.
    pub async fn resolve_currency(&self, name: &str) -> Result<(Currency, usize), CoreError> {
        if let Some(row) = self.warehouse.find_currency(name)? {
            return Ok((Currency::from(row), 0));
        }

        let url = self.config.currency_url(name);
        let mut raw = self.fetcher.fetch_page(&url, &[]).await.map_err(|error| match error {
            FetchError::Http { .. } => CoreError::CurrencyNotFound {
                name: name.to_owned(),
                source: error,
            },
            other => CoreError::Fetch(other),
        })?;
        apply_rules(&mut raw, &currency_rules());

        let remote_name = raw
            .first()
            .and_then(|record| record.get("currency_name"))
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| CoreError::CurrencyPayload {
                name: name.to_owned(),
            })?;

        let row = match self.warehouse.find_currency(remote_name)? {
            Some(row) => row,
            None => self.warehouse.create_currency(remote_name)?,
        };
        Ok((Currency::from(row), 1))
    }

    fn read_range(&self, currency: &Currency, range: DateRange) -> Result<Vec<DailyRecord>, CoreError> {
        self.warehouse
            .daily_records(currency.id, &iso_date(range.start()), &iso_date(range.end()))?
            .into_iter()
            .map(DailyRecord::try_from)
            .collect()
    }
}

/// Request pages covering `range`.
///
/// Ranges shorter than `limit` days are one page; longer ones are split into
/// chunks of `limit` consecutive days, each page bounded by its first and
/// last day.
pub fn page_params(range: DateRange, limit: usize) -> Vec<PageParams> {
    let limit = limit.max(1);
    if range.day_count() < limit {
        return vec![bounds(range.start(), range.end())];
    }

    let days: Vec<Date> = range.days().collect();
    days.chunks(limit)
        .filter_map(|chunk| Some(bounds(*chunk.first()?, *chunk.last()?)))
        .collect()
}

fn bounds(start: Date, end: Date) -> PageParams {
    vec![
        (String::from("start"), iso_date(start)),
        (String::from("end"), iso_date(end)),
    ]
}

/// Decode transformed records, keeping only in-range days that are neither
/// cached nor already seen in this batch.
fn new_rows(
    raw: Vec<RawRecord>,
    cached: &BTreeSet<Date>,
    range: DateRange,
) -> Result<Vec<DailyRecordRow>, CoreError> {
    let mut seen = cached.clone();
    let mut rows = Vec::new();

    for record in raw {
        let Some(date) = record
            .get("date")
            .and_then(Value::as_str)
            .and_then(crate::domain::parse_iso_date)
        else {
            tracing::debug!("skipping record without a usable date");
            continue;
        };
        if !range.contains(date) || !seen.insert(date) {
            continue;
        }
        rows.push(serde_json::from_value(Value::Object(record))?);
    }

    Ok(rows)
}
