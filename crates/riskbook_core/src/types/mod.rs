//! Fundamental value types shared by every riskbook crate.

pub mod currency;
pub mod error;
pub mod time;

pub use currency::Currency;
pub use error::{CurrencyError, DateError};
pub use time::{Date, DayCount};
