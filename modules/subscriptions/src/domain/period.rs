//! Month-precision calendar values.
//!
//! Subscriptions start and end on a month boundary; the day component never
//! carries meaning. `YearMonth` is persisted as the first day of the month.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid month '{input}': expected YYYY-MM")]
pub struct ParsePeriodError {
    pub input: String,
}

/// A calendar month. Ordering is chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Build from numeric parts; `None` unless `month` is 1..=12 and `year` fits four digits.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(0..=9999).contains(&year) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    /// Strict `YYYY-MM`: four year digits, a dash, two month digits in 01..=12.
    pub fn parse(input: &str) -> Result<Self, ParsePeriodError> {
        let err = || ParsePeriodError {
            input: input.to_string(),
        };

        let bytes = input.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(err());
        }
        let digits = |s: &[u8]| s.iter().all(u8::is_ascii_digit);
        if !digits(&bytes[..4]) || !digits(&bytes[5..]) {
            return Err(err());
        }

        let year: i32 = input[..4].parse().map_err(|_| err())?;
        let month: u32 = input[5..].parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The storage representation: day 1 of this month.
    pub fn first_day(&self) -> NaiveDate {
        // year and month are range-checked on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Truncate a stored date to its month.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ParsePeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<YearMonth> for NaiveDate {
    fn from(ym: YearMonth) -> Self {
        ym.first_day()
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_zero_padded() {
        let ym = YearMonth::parse("2024-01").unwrap();
        assert_eq!(ym.year(), 2024);
        assert_eq!(ym.month(), 1);
        assert_eq!(ym.to_string(), "2024-01");
        assert_eq!(YearMonth::new(7, 3).unwrap().to_string(), "0007-03");
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "", "2024", "2024-1", "2024-13", "2024-00", "24-01", "2024/01", "2024-01-15",
            " 2024-01", "+024-01", "2024--1", "abcd-ef",
        ] {
            assert!(YearMonth::parse(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn error_carries_input() {
        let err = YearMonth::parse("2024-13").unwrap_err();
        assert_eq!(err.input, "2024-13");
        assert!(err.to_string().contains("YYYY-MM"));
    }

    #[test]
    fn ordering_is_chronological() {
        let a = YearMonth::parse("2023-12").unwrap();
        let b = YearMonth::parse("2024-01").unwrap();
        let c = YearMonth::parse("2024-06").unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn date_round_trip_truncates_day() {
        let ym = YearMonth::parse("2024-06").unwrap();
        assert_eq!(ym.first_day(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let mid = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
        assert_eq!(YearMonth::from(mid), ym);
    }
}
