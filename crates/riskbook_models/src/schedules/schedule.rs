//! Remaining payment dates and their year fractions.

use riskbook_core::types::{Date, DayCount};

use super::error::ScheduleError;
use super::frequency::Frequency;

/// Payment dates strictly after a valuation date, with the year fraction
/// from the valuation date to each of them.
///
/// # Examples
///
/// ```
/// use riskbook_core::types::{Date, DayCount};
/// use riskbook_models::schedules::{Frequency, Schedule};
///
/// let first = Date::from_ymd(2017, 10, 1).unwrap();
/// let maturity = Date::from_ymd(2019, 4, 1).unwrap();
/// let val = Date::from_ymd(2018, 1, 15).unwrap();
///
/// let s = Schedule::coupons(first, maturity, Frequency::SemiAnnual, val, DayCount::Act365)
///     .unwrap();
/// assert_eq!(s.dates().len(), 3);
/// assert_eq!(s.dates()[0], Date::from_ymd(2018, 4, 1).unwrap());
/// assert_eq!(*s.dates().last().unwrap(), maturity);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    dates: Vec<Date>,
    times: Vec<f64>,
}

impl Schedule {
    /// Forward coupon schedule.
    ///
    /// Dates are `first_coupon + k * (12 / f)` months, each computed from the
    /// anchor, up to the first one that meets or passes `maturity`, which is
    /// replaced by `maturity` itself. Dates on or before `valuation` are
    /// dropped.
    pub fn coupons(
        first_coupon: Date,
        maturity: Date,
        frequency: Frequency,
        valuation: Date,
        day_count: DayCount,
    ) -> Result<Self, ScheduleError> {
        let step = frequency.months_between_payments();
        let mut all = Vec::new();
        let mut k = 0u32;
        loop {
            let date = first_coupon.add_months(k * step)?;
            if date >= maturity {
                all.push(maturity);
                break;
            }
            all.push(date);
            k += 1;
        }
        Ok(Self::after(all, valuation, day_count))
    }

    /// Backward premium schedule.
    ///
    /// Dates are `maturity - k * (12 / f)` months for as long as they fall
    /// after `valuation`, returned in ascending order.
    pub fn premiums(
        maturity: Date,
        frequency: Frequency,
        valuation: Date,
        day_count: DayCount,
    ) -> Result<Self, ScheduleError> {
        let step = frequency.months_between_payments();
        let mut all = Vec::new();
        let mut k = 0u32;
        loop {
            let date = maturity.sub_months(k * step)?;
            if date <= valuation {
                break;
            }
            all.push(date);
            k += 1;
        }
        all.reverse();
        Ok(Self::after(all, valuation, day_count))
    }

    fn after(all: Vec<Date>, valuation: Date, day_count: DayCount) -> Self {
        let dates: Vec<Date> = all.into_iter().filter(|d| *d > valuation).collect();
        let times = dates
            .iter()
            .map(|d| day_count.year_fraction(valuation, *d))
            .collect();
        Self { dates, times }
    }

    /// Remaining payment dates in ascending order.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Year fractions from the valuation date to each payment date.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Number of remaining payments.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// True when every payment has already been made.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Year fraction to the final payment.
    pub fn last_time(&self) -> Option<f64> {
        self.times.last().copied()
    }

    /// Iterates over `(date, year fraction)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.dates.iter().copied().zip(self.times.iter().copied())
    }
}
