//! Data loading error types.

use std::path::PathBuf;

use riskbook_core::market::MarketDataError;
use riskbook_core::types::DateError;
use thiserror::Error;

use crate::scenarios::ScenarioError;

/// Errors raised while reading portfolio, market or scenario files.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A data file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// A JSON file or record does not match the expected schema.
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// File path
        path: PathBuf,
        /// Parser failure
        source: serde_json::Error,
    },

    /// The scenario CSV is malformed.
    #[error("Invalid CSV in {path}: {source}")]
    Csv {
        /// File path
        path: PathBuf,
        /// Reader failure
        source: csv::Error,
    },

    /// A column header is not a valid risk factor key.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    /// A date field could not be parsed.
    #[error(transparent)]
    Date(#[from] DateError),

    /// The loaded rows do not form a valid scenario set.
    #[error(transparent)]
    Scenario(#[from] ScenarioError),

    /// A derivative refers to a stock that is not in the file.
    #[error("Instrument '{instrument}' refers to unknown underlying '{underlying}'")]
    UnknownUnderlying {
        /// Referring instrument
        instrument: String,
        /// Missing stock ID
        underlying: String,
    },

    /// A record is structurally valid but its content is not.
    #[error("{path}, record {record}: {reason}")]
    InvalidRecord {
        /// File path
        path: PathBuf,
        /// Zero-based record index
        record: usize,
        /// What is wrong
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_underlying() {
        let err = LoaderError::UnknownUnderlying {
            instrument: "RY-C".to_string(),
            underlying: "RY".to_string(),
        };
        assert_eq!(format!("{}", err), "Instrument 'RY-C' refers to unknown underlying 'RY'");
    }

    #[test]
    fn test_error_display_invalid_record() {
        let err = LoaderError::InvalidRecord {
            path: PathBuf::from("data/historical_scenarios.csv"),
            record: 3,
            reason: "value 'abc' is not a number".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "data/historical_scenarios.csv, record 3: value 'abc' is not a number"
        );
    }
}
