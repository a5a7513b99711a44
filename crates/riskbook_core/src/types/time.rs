//! Dates and day count conventions.
//!
//! This module provides:
//! - `Date`: Type-safe date wrapper around chrono::NaiveDate with month arithmetic
//! - `DayCount`: Day count conventions used to turn date spans into year fractions
//!
//! # Examples
//!
//! ```
//! use riskbook_core::types::{Date, DayCount};
//!
//! let start = Date::from_ymd(2017, 6, 1).unwrap();
//! let end = start.add_months(6).unwrap();
//! assert_eq!(end, Date::from_ymd(2017, 12, 1).unwrap());
//!
//! let yf = DayCount::Act365.year_fraction(start, end);
//! assert!((yf - 183.0 / 365.0).abs() < 1e-12);
//! ```

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use super::error::DateError;

/// Calendar date used for valuation, schedules and maturities.
///
/// Serialises as an ISO 8601 string (`YYYY-MM-DD`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a date from year, month and day components.
    ///
    /// # Examples
    ///
    /// ```
    /// use riskbook_core::types::Date;
    ///
    /// assert!(Date::from_ymd(2024, 2, 29).is_ok());
    /// assert!(Date::from_ymd(2023, 2, 29).is_err());
    /// ```
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or(DateError::InvalidDate { year, month, day })
    }

    /// Parses an ISO 8601 date string (`YYYY-MM-DD`).
    pub fn parse(s: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Date)
            .map_err(|e| DateError::ParseError(format!("'{}': {}", s, e)))
    }

    /// Returns the underlying NaiveDate.
    #[inline]
    pub fn into_inner(self) -> NaiveDate {
        self.0
    }

    /// Returns the year component.
    #[inline]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Returns the month component (1-12).
    #[inline]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Returns the day of month.
    #[inline]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Adds a number of calendar months, clamping to the month end.
    ///
    /// `2017-01-31 + 1 month` is `2017-02-28`.
    pub fn add_months(self, months: u32) -> Result<Self, DateError> {
        self.0
            .checked_add_months(Months::new(months))
            .map(Date)
            .ok_or_else(|| DateError::Overflow(format!("{} + {} months", self, months)))
    }

    /// Subtracts a number of calendar months, clamping to the month end.
    pub fn sub_months(self, months: u32) -> Result<Self, DateError> {
        self.0
            .checked_sub_months(Months::new(months))
            .map(Date)
            .ok_or_else(|| DateError::Overflow(format!("{} - {} months", self, months)))
    }

    /// Signed number of days from `self` to `other`.
    #[inline]
    pub fn days_until(self, other: Date) -> i64 {
        other - self
    }
}

impl Sub for Date {
    type Output = i64;

    fn sub(self, other: Self) -> i64 {
        (self.0 - other.0).num_days()
    }
}

impl FromStr for Date {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, DateError> {
        Date::parse(s)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for Date {
    fn from(date: NaiveDate) -> Self {
        Date(date)
    }
}

/// Day count convention for year fraction calculations.
///
/// Parsed from the market names `ACT/365`, `ACT/360` and `30/360`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DayCount {
    /// Actual/365 Fixed.
    #[default]
    Act365,
    /// Actual/360.
    Act360,
    /// 30/360 US bond basis.
    Thirty360,
}

impl DayCount {
    /// Returns the market name of the convention.
    pub fn name(&self) -> &'static str {
        match self {
            DayCount::Act365 => "ACT/365",
            DayCount::Act360 => "ACT/360",
            DayCount::Thirty360 => "30/360",
        }
    }

    /// Signed year fraction between two dates.
    ///
    /// Negative when `end` precedes `start`.
    pub fn year_fraction(&self, start: Date, end: Date) -> f64 {
        match self {
            DayCount::Act365 => (end - start) as f64 / 365.0,
            DayCount::Act360 => (end - start) as f64 / 360.0,
            DayCount::Thirty360 => {
                let (a, b, sign) = if start <= end {
                    (start, end, 1.0)
                } else {
                    (end, start, -1.0)
                };
                let d1 = if a.day() == 31 { 30 } else { a.day() };
                let d2 = if b.day() == 31 && d1 == 30 { 30 } else { b.day() };
                let days = 360 * (b.year() - a.year())
                    + 30 * (b.month() as i32 - a.month() as i32)
                    + (d2 as i32 - d1 as i32);
                sign * days as f64 / 360.0
            }
        }
    }
}

impl FromStr for DayCount {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACT/365" | "ACT/365F" | "ACTUAL/365" => Ok(DayCount::Act365),
            "ACT/360" | "ACTUAL/360" => Ok(DayCount::Act360),
            "30/360" | "30/360 US" => Ok(DayCount::Thirty360),
            other => Err(DateError::UnknownDayCount(other.to_string())),
        }
    }
}

impl TryFrom<String> for DayCount {
    type Error = DateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DayCount> for String {
    fn from(value: DayCount) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for DayCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
