//! Schedule generation error types.

use riskbook_core::types::DateError;
use thiserror::Error;

/// Errors that can occur during schedule generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Payment count per year has no matching frequency.
    #[error("Unsupported payment frequency: {0} per year")]
    InvalidFrequency(u32),

    /// Frequency name could not be parsed.
    #[error("Unknown frequency name: '{0}'")]
    UnknownFrequency(String),

    /// Date arithmetic overflow.
    #[error("Date arithmetic overflow: {reason}")]
    DateOverflow {
        /// Reason for the overflow.
        reason: String,
    },
}

impl From<DateError> for ScheduleError {
    fn from(err: DateError) -> Self {
        ScheduleError::DateOverflow {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ScheduleError::InvalidFrequency(3).to_string(),
            "Unsupported payment frequency: 3 per year"
        );
        let err: ScheduleError = DateError::Overflow("9999-12-31 + 6M".to_string()).into();
        assert!(err.to_string().contains("9999-12-31"));
    }
}
