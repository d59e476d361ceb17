use std::fmt::{Display, Formatter};

use time::{Date, Month};

use crate::domain::models::iso_date;
use crate::ValidationError;

/// Closed interval of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::StartAfterEnd {
                start: iso_date(start),
                end: iso_date(end),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse user input; `YYYY-MM` expands to the first day of the month for
    /// `start` and to the last day of the month for `end`.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_start_date(start)?, parse_end_date(end)?)
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    /// Number of days in the range, both ends included.
    pub fn day_count(&self) -> usize {
        // start <= end is guaranteed by construction
        (self.end - self.start).whole_days() as usize + 1
    }

    /// Every calendar day of the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = Date> {
        let start = self.start;
        let end = self.end;
        std::iter::successors(Some(start), move |day| {
            day.next_day().filter(|next| *next <= end)
        })
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Display for DateRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", iso_date(self.start), iso_date(self.end))
    }
}

/// Accepts `YYYY-MM-DD` or `YYYY-MM` (first day of that month).
pub fn parse_start_date(value: &str) -> Result<Date, ValidationError> {
    match parse_user_date(value)? {
        UserDate::Day(date) => Ok(date),
        UserDate::Month(year, month) => first_day(year, month, value),
    }
}

/// Accepts `YYYY-MM-DD` or `YYYY-MM` (last day of that month).
pub fn parse_end_date(value: &str) -> Result<Date, ValidationError> {
    match parse_user_date(value)? {
        UserDate::Day(date) => Ok(date),
        UserDate::Month(year, month) => {
            let next_month = if month == Month::December {
                first_day(year + 1, Month::January, value)?
            } else {
                first_day(year, month.next(), value)?
            };
            next_month
                .previous_day()
                .ok_or_else(|| ValidationError::InvalidDateFormat {
                    value: value.to_owned(),
                })
        }
    }
}

/// Strict `YYYY-MM-DD` parsing used for stored and remote dates.
pub(crate) fn parse_iso_date(value: &str) -> Option<Date> {
    match parse_user_date(value).ok()? {
        UserDate::Day(date) => Some(date),
        UserDate::Month(..) => None,
    }
}

enum UserDate {
    Day(Date),
    Month(i32, Month),
}

fn parse_user_date(value: &str) -> Result<UserDate, ValidationError> {
    let invalid = || ValidationError::InvalidDateFormat {
        value: value.to_owned(),
    };

    let parts: Vec<&str> = value.trim().split('-').collect();
    let (year, month, day) = match parts.as_slice() {
        [year, month] => (*year, *month, None),
        [year, month, day] => (*year, *month, Some(*day)),
        _ => return Err(invalid()),
    };

    let year = parse_component::<i32>(year, 4, 4).ok_or_else(invalid)?;
    let month = parse_component::<u8>(month, 1, 2)
        .and_then(|month| Month::try_from(month).ok())
        .ok_or_else(invalid)?;

    match day {
        None => Ok(UserDate::Month(year, month)),
        Some(day) => {
            let day = parse_component::<u8>(day, 1, 2).ok_or_else(invalid)?;
            Date::from_calendar_date(year, month, day)
                .map(UserDate::Day)
                .map_err(|_| invalid())
        }
    }
}

fn parse_component<T: std::str::FromStr>(value: &str, min_len: usize, max_len: usize) -> Option<T> {
    let valid = (min_len..=max_len).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit());
    if !valid {
        return None;
    }
    value.parse().ok()
}

fn first_day(year: i32, month: Month, input: &str) -> Result<Date, ValidationError> {
    Date::from_calendar_date(year, month, 1).map_err(|_| ValidationError::InvalidDateFormat {
        value: input.to_owned(),
    })
}
