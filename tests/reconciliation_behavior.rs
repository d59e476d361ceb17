//! Behavior-driven tests for range reconciliation
//!
//! These tests verify HOW the reconciler decides what to download, what it
//! stores, and what it reports when the remote API misbehaves.

use std::collections::BTreeSet;
use std::sync::Arc;

use coinstreak_core::{
    iso_date, ApiConfig, CoreError, FetchError, HttpError, HttpResponse, Reconciler,
    ReplayHttpClient,
};
use coinstreak_tests::{
    answer, flat_market, january_2020, market_client, open_warehouse, page_bounds, range,
    reconciler, COIN,
};
use coinstreak_warehouse::DailyRecordRow;
use tempfile::tempdir;

// =============================================================================
// Reconciler: Cache Reuse
// =============================================================================

#[tokio::test]
async fn when_user_repeats_a_query_no_request_is_sent() {
    // Given: A fresh warehouse and a healthy API
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let client = market_client(january_2020());
    let reconciler = reconciler(&warehouse, client.clone());
    let january = range("2020-01-01", "2020-01-31");

    // When: The same range is requested twice
    let first = reconciler.get_data(COIN, january).await.expect("first call");
    let requests_after_first = client.request_count();
    let second = reconciler.get_data(COIN, january).await.expect("second call");

    // Then: The second answer comes from the warehouse alone
    assert_eq!(requests_after_first, 2, "currency lookup plus one page");
    assert_eq!(first.requests_issued, 2);
    assert_eq!(second.requests_issued, 0);
    assert_eq!(client.request_count(), requests_after_first);
    assert_eq!(first.records, second.records);
    assert_eq!(second.records.len(), 31);
    assert!(second.fetch_error.is_none());
}

#[tokio::test]
async fn when_a_sub_range_is_cached_it_is_served_without_requests() {
    // Given: January 2020 already reconciled
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let client = market_client(january_2020());
    let reconciler = reconciler(&warehouse, client.clone());
    reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("warm up");
    client.clear();

    // When: A week inside January is requested
    let week = reconciler
        .get_data(COIN, range("2020-01-10", "2020-01-16"))
        .await
        .expect("week");

    // Then: Exactly that week is returned, from the cache
    assert_eq!(client.request_count(), 0);
    let dates: Vec<String> = week.records.iter().map(|r| iso_date(r.date)).collect();
    assert_eq!(dates.first().map(String::as_str), Some("2020-01-10"));
    assert_eq!(dates.last().map(String::as_str), Some("2020-01-16"));
    assert_eq!(dates.len(), 7);
}

// =============================================================================
// Reconciler: Gap Filling
// =============================================================================

#[tokio::test]
async fn when_some_days_are_cached_only_the_missing_ones_are_stored() {
    // Given: A known currency with five scattered days already stored
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let currency = warehouse.create_currency(COIN).expect("currency");
    let seeded = ["2020-01-01", "2020-01-07", "2020-01-15", "2020-01-16", "2020-01-31"];
    let rows: Vec<DailyRecordRow> = seeded
        .iter()
        .map(|date| DailyRecordRow {
            date: date.to_string(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
        })
        .collect();
    warehouse
        .ingest_daily_records(currency.id, &rows)
        .expect("seed");

    let client = market_client(january_2020());
    let reconciler = reconciler(&warehouse, client.clone());

    // When: The whole month is requested
    let result = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("reconcile");

    // Then: Every day is present once, in order, and cached rows are untouched
    assert!(result.fetch_error.is_none());
    assert_eq!(result.records.len(), 31);
    let dates: Vec<_> = result.records.iter().map(|r| r.date).collect();
    assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(dates.iter().collect::<BTreeSet<_>>().len(), 31);

    for record in &result.records {
        let was_seeded = seeded.contains(&iso_date(record.date).as_str());
        assert_eq!(record.close == 1.0, was_seeded, "{}", iso_date(record.date));
    }

    // And: The currency was not looked up again
    assert_eq!(client.request_count(), 1);
}

#[tokio::test]
async fn when_the_api_repeats_a_day_it_is_stored_once() {
    // Given: An API that returns every record of the page twice
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let market = january_2020();
    let client = Arc::new(ReplayHttpClient::new(move |request| {
        let response = answer(&market, request);
        if !request.url.ends_with("/ohlcv/historical") {
            return Ok(response);
        }
        let rows: Vec<serde_json::Value> = serde_json::from_str(&response.body).expect("rows");
        let doubled: Vec<_> = rows.iter().chain(rows.iter()).cloned().collect();
        Ok(HttpResponse::ok_json(serde_json::Value::Array(doubled).to_string()))
    }));
    let reconciler = reconciler(&warehouse, client);

    // When: A week is reconciled
    let result = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-07"))
        .await
        .expect("reconcile");

    // Then: The primary key was never violated
    assert!(result.fetch_error.is_none());
    assert_eq!(result.records.len(), 7);
}

#[tokio::test]
async fn when_the_api_has_no_data_for_some_days_the_gap_is_reported_honestly() {
    // Given: An API that knows only the first ten days of January
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let market = january_2020()
        .into_iter()
        .filter(|(date, _)| date.as_str() <= "2020-01-10")
        .collect();
    let client = market_client(market);
    let reconciler = reconciler(&warehouse, client.clone());

    // When: The whole month is requested twice
    let first = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("first");
    let second = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("second");

    // Then: Only the known days are returned and the gap is asked for again
    assert_eq!(first.records.len(), 10);
    assert_eq!(second.records.len(), 10);
    assert_eq!(second.requests_issued, 1);
}

// =============================================================================
// Reconciler: Page Splitting
// =============================================================================

#[tokio::test]
async fn when_range_exceeds_the_row_limit_it_is_split_into_pages() {
    // Given: Two years of prices and the default 360-row limit
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let two_years = range("2019-01-01", "2020-12-31");
    let client = market_client(flat_market(two_years, 5000.0));
    let reconciler = reconciler(&warehouse, client.clone());

    // When: The whole span is requested
    let result = reconciler.get_data(COIN, two_years).await.expect("reconcile");

    // Then: ceil(731 / 360) pages are issued, bounded by their chunks
    assert_eq!(
        page_bounds(&client),
        vec![
            ("2019-01-01".to_string(), "2019-12-26".to_string()),
            ("2019-12-27".to_string(), "2020-12-20".to_string()),
            ("2020-12-21".to_string(), "2020-12-31".to_string()),
        ]
    );
    assert_eq!(result.records.len(), 731);
    assert_eq!(result.requests_issued, 4);
}

#[tokio::test]
async fn when_range_is_below_the_row_limit_one_page_covers_it() {
    // Given: A configured limit larger than the range
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let client = market_client(january_2020());
    let reconciler = Reconciler::new(
        warehouse.clone(),
        client.clone(),
        ApiConfig::default()
            .with_base_url("http://api.test/v1")
            .with_rows_limit(32),
    );

    // When: January is requested
    reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("reconcile");

    // Then: A single page spans the whole range
    assert_eq!(
        page_bounds(&client),
        vec![("2020-01-01".to_string(), "2020-01-31".to_string())]
    );
}

// =============================================================================
// Reconciler: Failures
// =============================================================================

#[tokio::test]
async fn when_a_page_fails_nothing_is_stored_and_the_error_is_returned() {
    // Given: An API that fails on the second of four pages
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let market = january_2020();
    let client = Arc::new(ReplayHttpClient::new(move |request| {
        if request.query_param("start") == Some("2020-01-11") {
            return Ok(HttpResponse::with_status(503, "unavailable"));
        }
        Ok(answer(&market, request))
    }));
    let reconciler = Reconciler::new(
        warehouse.clone(),
        client.clone(),
        ApiConfig::default()
            .with_base_url("http://api.test/v1")
            .with_rows_limit(10),
    );

    // When: January is requested
    let result = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("currency resolves");

    // Then: The error is surfaced, remaining pages were skipped, nothing was stored
    assert!(matches!(
        result.fetch_error,
        Some(FetchError::Http { status: 503, .. })
    ));
    assert_eq!(page_bounds(&client).len(), 2);
    assert!(result.records.is_empty());
    assert!(matches!(result.into_result(), Err(CoreError::Fetch(_))));
}

#[tokio::test]
async fn when_the_api_recovers_the_next_run_completes_the_range() {
    // Given: A first run that timed out on every historical request
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let market = january_2020();
    let broken = Arc::new(ReplayHttpClient::new(move |request| {
        if request.url.ends_with("/ohlcv/historical") {
            Err(HttpError::timeout("upstream too slow"))
        } else {
            Ok(answer(&market, request))
        }
    }));
    let failed = reconciler(&warehouse, broken)
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("currency resolves");
    assert!(matches!(failed.fetch_error, Some(FetchError::Timeout { .. })));

    // When: The same range is requested against a healthy API
    let healthy = market_client(january_2020());
    let result = reconciler(&warehouse, healthy.clone())
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("reconcile");

    // Then: The stored currency is reused and the range is complete
    assert!(result.fetch_error.is_none());
    assert_eq!(result.records.len(), 31);
    assert_eq!(healthy.request_count(), 1);
}

// =============================================================================
// Reconciler: Currency Resolution
// =============================================================================

#[tokio::test]
async fn when_user_names_an_unknown_coin_the_error_suggests_checking_it() {
    // Given: An API that knows only bitcoin
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let client = market_client(january_2020());
    let reconciler = reconciler(&warehouse, client.clone());

    // When: A misspelled coin is requested
    let error = reconciler
        .get_data("btc-bitcon", range("2020-01-01", "2020-01-31"))
        .await
        .expect_err("must fail");

    // Then: The lookup error carries a hint and nothing else happened
    assert!(matches!(
        error,
        CoreError::CurrencyNotFound {
            source: FetchError::Http { status: 404, .. },
            ..
        }
    ));
    assert!(error.to_string().contains("btc-bitcon"));
    assert!(error.to_string().contains("coin identifier is correct"));
    assert_eq!(client.request_count(), 1);
    assert!(warehouse.find_currency("btc-bitcon").expect("query").is_none());
}

#[tokio::test]
async fn when_the_lookup_cannot_connect_the_transport_error_is_returned() {
    // Given: An unreachable API
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let client = Arc::new(ReplayHttpClient::new(|_| Err(HttpError::connection("refused"))));
    let reconciler = reconciler(&warehouse, client);

    // When: An unknown currency has to be looked up
    let error = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-02"))
        .await
        .expect_err("must fail");

    // Then: The classified transport error is returned without a hint
    assert!(matches!(error, CoreError::Fetch(FetchError::Connection { .. })));
}

#[tokio::test]
async fn when_a_coin_is_first_seen_it_is_stored_under_its_remote_id() {
    // Given: A fresh warehouse
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let reconciler = reconciler(&warehouse, market_client(january_2020()));

    // When: The coin is resolved
    let (currency, requests) = reconciler.resolve_currency(COIN).await.expect("resolve");

    // Then: It is persisted and later resolutions are local
    assert_eq!(requests, 1);
    assert_eq!(currency.name, COIN);
    let stored = warehouse.find_currency(COIN).expect("query").expect("stored");
    assert_eq!(stored.id, currency.id);

    let (again, requests) = reconciler.resolve_currency(COIN).await.expect("resolve again");
    assert_eq!(requests, 0);
    assert_eq!(again, currency);
}
