use time::Month;

use crate::analytics::round_price;
use crate::domain::{DailyRecord, PriceField};

/// Mean price over one contiguous calendar-month run.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAverage {
    pub year: i32,
    pub month: Month,
    pub average: f64,
    pub days: usize,
}

impl MonthlyAverage {
    /// `YYYY-MM`
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, u8::from(self.month))
    }
}

/// Average `field` per month, in input order.
///
/// A new bucket starts whenever the (year, month) of a record differs from
/// the previous record's, so the input must already be date-ascending.
pub fn monthly_averages(records: &[DailyRecord], field: PriceField) -> Vec<MonthlyAverage> {
    let mut buckets: Vec<(i32, Month, f64, usize)> = Vec::new();

    for record in records {
        let key = (record.date.year(), record.date.month());
        let price = record.price(field);
        match buckets.last_mut() {
            Some((year, month, sum, count)) if (*year, *month) == key => {
                *sum += price;
                *count += 1;
            }
            _ => buckets.push((key.0, key.1, price, 1)),
        }
    }

    buckets
        .into_iter()
        .map(|(year, month, sum, days)| MonthlyAverage {
            year,
            month,
            average: round_price(sum / days as f64),
            days,
        })
        .collect()
}
