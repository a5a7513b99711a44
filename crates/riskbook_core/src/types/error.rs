//! Error types for value construction and parsing.
//!
//! This module provides:
//! - `DateError`: Errors from date construction, parsing and arithmetic
//! - `CurrencyError`: Errors from currency code parsing

use thiserror::Error;

/// Date-related errors.
///
/// # Examples
/// ```
/// use riskbook_core::types::DateError;
///
/// let err = DateError::InvalidDate { year: 2024, month: 2, day: 30 };
/// assert_eq!(format!("{}", err), "Invalid date: 2024-2-30");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// Invalid date components.
    #[error("Invalid date: {year}-{month}-{day}")]
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component
        month: u32,
        /// Day component
        day: u32,
    },

    /// Failed to parse a date string.
    #[error("Failed to parse date: {0}")]
    ParseError(String),

    /// Date arithmetic left the representable range.
    #[error("Date arithmetic overflow: {0}")]
    Overflow(String),

    /// Unrecognised day count convention name.
    #[error("Unknown day count convention: {0}")]
    UnknownDayCount(String),
}

/// Currency parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Code is not three alphabetic characters.
    #[error("Invalid currency code: '{0}'")]
    InvalidCode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_error_display() {
        let err = DateError::ParseError("bad".to_string());
        assert_eq!(err.to_string(), "Failed to parse date: bad");
    }

    #[test]
    fn test_currency_error_display() {
        let err = CurrencyError::InvalidCode("US".to_string());
        assert_eq!(err.to_string(), "Invalid currency code: 'US'");
    }
}
