//! Behavior-driven tests for analyses over reconciled ranges
//!
//! These tests run the full path a command takes: reconcile a range against
//! an in-process API, then analyse or export what the warehouse returns.

use std::collections::BTreeMap;
use std::fs;

use coinstreak_core::{
    best_increase_runs, export_records, iso_date, monthly_averages, ExportFormat, MonthlyAverage,
    PriceField, RunRanking,
};
use coinstreak_tests::{flat_market, january_2020, market_client, open_warehouse, range, reconciler, COIN};
use tempfile::tempdir;

// =============================================================================
// Analytics: Consecutive Increase
// =============================================================================

#[tokio::test]
async fn when_user_asks_for_the_longest_increase_of_january_the_best_run_is_found() {
    // Given: January 2020 prices served by the API
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let reconciler = reconciler(&warehouse, market_client(january_2020()));

    // When: The range is reconciled and analysed
    let records = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("reconcile")
        .into_result()
        .expect("no fetch error");
    let runs = best_increase_runs(&records, PriceField::Close, RunRanking::Gain);

    // Then: Exactly one period is reported, the 25th to the 28th
    assert_eq!(runs.len(), 1);
    assert_eq!(iso_date(runs[0].start), "2020-01-25");
    assert_eq!(iso_date(runs[0].end), "2020-01-28");
    assert_eq!(runs[0].gain, 966.27);

    // And: It is also the longest by number of days
    let by_days = best_increase_runs(&records, PriceField::Close, RunRanking::Duration);
    assert_eq!(by_days, runs);
}

#[tokio::test]
async fn when_the_series_only_falls_no_increase_is_reported() {
    // Given: Prices that drop every day
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let falling: BTreeMap<String, f64> = range("2020-01-01", "2020-01-10")
        .days()
        .enumerate()
        .map(|(offset, day)| (iso_date(day), 9000.0 - offset as f64 * 50.0))
        .collect();
    let reconciler = reconciler(&warehouse, market_client(falling));

    // When: The range is analysed
    let records = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-10"))
        .await
        .expect("reconcile")
        .into_result()
        .expect("no fetch error");

    // Then: There is no run to report
    assert_eq!(records.len(), 10);
    assert!(best_increase_runs(&records, PriceField::Close, RunRanking::Gain).is_empty());
}

// =============================================================================
// Analytics: Monthly Averages
// =============================================================================

#[tokio::test]
async fn when_user_asks_for_three_months_three_averages_are_returned() {
    // Given: January from the fixture, then flat February and March prices
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let mut market = january_2020();
    market.extend(flat_market(range("2020-02-01", "2020-02-29"), 9663.34));
    market.extend(flat_market(range("2020-03-01", "2020-03-31"), 6884.03));
    let reconciler = reconciler(&warehouse, market_client(market));

    // When: A month-granular range is reconciled and averaged
    let records = reconciler
        .get_data(COIN, range("2020-01", "2020-03"))
        .await
        .expect("reconcile")
        .into_result()
        .expect("no fetch error");
    let averages = monthly_averages(&records, PriceField::Close);

    // Then: One average per month, in order
    assert_eq!(records.len(), 91);
    let labels: Vec<String> = averages.iter().map(MonthlyAverage::label).collect();
    assert_eq!(labels, vec!["2020-01", "2020-02", "2020-03"]);
    let values: Vec<f64> = averages.iter().map(|average| average.average).collect();
    assert_eq!(values, vec![8174.42, 9663.34, 6884.03]);
}

#[tokio::test]
async fn when_user_averages_another_price_field_it_is_used() {
    // Given: February with flat closes; the fixture API reports high = close + 25
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let february = range("2020-02-01", "2020-02-29");
    let reconciler = reconciler(&warehouse, market_client(flat_market(february, 100.0)));

    // When: The high prices are averaged
    let records = reconciler
        .get_data(COIN, february)
        .await
        .expect("reconcile")
        .into_result()
        .expect("no fetch error");
    let averages = monthly_averages(&records, PriceField::High);

    // Then: The average follows the selected field
    assert_eq!(averages.len(), 1);
    assert_eq!(averages[0].average, 125.0);
    assert_eq!(averages[0].days, 29);
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn when_user_exports_csv_there_is_a_header_and_one_line_per_day() {
    // Given: Reconciled January prices
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let reconciler = reconciler(&warehouse, market_client(january_2020()));
    let records = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("reconcile")
        .into_result()
        .expect("no fetch error");

    // When: They are exported as CSV under a JSON-looking name
    let requested = temp.path().join("test.json");
    let path = export_records(
        &records,
        PriceField::Close,
        ExportFormat::Csv,
        requested.to_str().expect("utf8"),
    )
    .expect("export");

    // Then: The extension follows the format and the file has N + 1 lines
    assert_eq!(path, temp.path().join("test.csv"));
    let content = fs::read_to_string(&path).expect("read");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 32);
    assert_eq!(lines[0], "Date,Price ($)");
    assert_eq!(lines[1], "2020-01-01,7200");
    assert_eq!(lines[25], "2020-01-25,8445.43");
}

#[tokio::test]
async fn when_user_exports_json_there_is_one_element_per_day() {
    // Given: Reconciled January prices
    let temp = tempdir().expect("tempdir");
    let warehouse = open_warehouse(&temp);
    let reconciler = reconciler(&warehouse, market_client(january_2020()));
    let records = reconciler
        .get_data(COIN, range("2020-01-01", "2020-01-31"))
        .await
        .expect("reconcile")
        .into_result()
        .expect("no fetch error");

    // When: The open prices are exported as JSON
    let requested = temp.path().join("test");
    let path = export_records(
        &records,
        PriceField::Open,
        ExportFormat::Json,
        requested.to_str().expect("utf8"),
    )
    .expect("export");

    // Then: The file is an array of {date, price} objects
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("valid json");
    let items = parsed.as_array().expect("array");
    assert_eq!(items.len(), 31);
    assert_eq!(items[0]["date"], "2020-01-01");
    assert_eq!(items[0]["price"], 7190.0);
}
