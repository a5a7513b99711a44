//! Payment schedule generation.
//!
//! This module provides:
//! - [`Frequency`]: coupon and premium payment frequency
//! - [`Schedule`]: remaining payment dates with their year fractions
//! - [`ScheduleError`]: schedule generation errors
//!
//! Two generators are used by the pricers. Coupon schedules step forward
//! from the first coupon date and are clamped to maturity; premium schedules
//! step backward from maturity. Both drop dates on or before the valuation
//! date.

mod error;
mod frequency;
mod schedule;

pub use error::ScheduleError;
pub use frequency::Frequency;
pub use schedule::Schedule;
