//! Analyses over a reconciled, date-ascending price series.

mod monthly;
mod streak;

pub use monthly::{monthly_averages, MonthlyAverage};
pub use streak::{best_increase_runs, increase_pairs, local_extrema, Extrema, IncreaseRun, RunRanking};

/// Round to cents, leaving values below one cent untouched.
pub fn round_price(value: f64) -> f64 {
    if value >= 0.01 {
        round_cents(value)
    } else {
        value
    }
}

/// Unconditional rounding to two decimals.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
