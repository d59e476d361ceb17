use time::Date;

use crate::analytics::round_price;
use crate::domain::{DailyRecord, PriceField};

/// Indices of strict local minima and maxima, each ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extrema {
    pub minima: Vec<usize>,
    pub maxima: Vec<usize>,
}

/// One trough-to-peak increase.
#[derive(Debug, Clone, PartialEq)]
pub struct IncreaseRun {
    pub start: Date,
    pub end: Date,
    pub start_price: f64,
    pub end_price: f64,
    /// Peak minus trough, rounded to cents when at least one cent.
    pub gain: f64,
}

impl IncreaseRun {
    /// Calendar days between trough and peak.
    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days()
    }
}

/// How competing runs are ranked; every run tied at the top is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunRanking {
    /// Largest price gain.
    #[default]
    Gain,
    /// Most calendar days from trough to peak.
    Duration,
}

/// Classify every index of `prices`.
///
/// The first and last points compare against their single neighbour; interior
/// points must be strictly below (or above) both neighbours. Ties are neither.
pub fn local_extrema(prices: &[f64]) -> Extrema {
    let mut extrema = Extrema::default();
    let n = prices.len();
    if n < 2 {
        return extrema;
    }

    for index in 0..n {
        let value = prices[index];
        let neighbours = match index {
            0 => [prices[1], prices[1]],
            i if i == n - 1 => [prices[i - 1], prices[i - 1]],
            i => [prices[i - 1], prices[i + 1]],
        };

        if neighbours.iter().all(|neighbour| value < *neighbour) {
            extrema.minima.push(index);
        } else if neighbours.iter().all(|neighbour| value > *neighbour) {
            extrema.maxima.push(index);
        }
    }

    extrema
}

/// Pair troughs with the peaks that follow them, as `(min_index, max_index)`.
///
/// A leading peak cannot close a run and a trailing trough cannot open one,
/// so the surplus extremum is dropped before pairing positionally. With equal
/// counts and a peak at index 0, both the first peak and the last trough go.
pub fn increase_pairs(prices: &[f64]) -> Vec<(usize, usize)> {
    let Extrema {
        mut minima,
        mut maxima,
    } = local_extrema(prices);

    if maxima.len() > minima.len() {
        maxima.remove(0);
    } else if minima.len() > maxima.len() {
        minima.pop();
    } else if maxima.first() == Some(&0) {
        maxima.remove(0);
        minima.pop();
    }

    minima.into_iter().zip(maxima).collect()
}

/// Every increase run tied for the top spot under `ranking`, in date order.
///
/// Fewer than two records, or a series without a trough-to-peak pair, yields
/// an empty result.
pub fn best_increase_runs(
    records: &[DailyRecord],
    field: PriceField,
    ranking: RunRanking,
) -> Vec<IncreaseRun> {
    let prices: Vec<f64> = records.iter().map(|record| record.price(field)).collect();
    let pairs = increase_pairs(&prices);
    let raw_gain = |(low, high): (usize, usize)| (prices[high] - prices[low]).abs();

    let best: Vec<(usize, usize)> = match ranking {
        RunRanking::Gain => {
            let top = pairs.iter().map(|&pair| raw_gain(pair)).fold(f64::NEG_INFINITY, f64::max);
            pairs.into_iter().filter(|&pair| raw_gain(pair) == top).collect()
        }
        RunRanking::Duration => {
            let span = |(low, high): (usize, usize)| (records[high].date - records[low].date).whole_days();
            let top = pairs.iter().map(|&pair| span(pair)).max().unwrap_or_default();
            pairs.into_iter().filter(|&pair| span(pair) == top).collect()
        }
    };

    best.into_iter()
        .map(|(low, high)| IncreaseRun {
            start: records[low].date,
            end: records[high].date,
            start_price: prices[low],
            end_price: prices[high],
            gain: round_price(raw_gain((low, high))),
        })
        .collect()
}
