//! ISO 4217 style currency codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::CurrencyError;

/// Three-letter currency code (e.g. `CAD`, `USD`, `EUR`).
///
/// Stored inline so the type is `Copy`; codes are normalised to upper case.
///
/// # Examples
///
/// ```
/// use riskbook_core::types::Currency;
///
/// let cad: Currency = "cad".parse().unwrap();
/// assert_eq!(cad.code(), "CAD");
/// assert!("CA".parse::<Currency>().is_err());
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    /// Canadian dollar.
    pub const CAD: Currency = Currency(*b"CAD");
    /// US dollar.
    pub const USD: Currency = Currency(*b"USD");
    /// Euro.
    pub const EUR: Currency = Currency(*b"EUR");

    /// Creates a currency from a three-letter alphabetic code.
    pub fn new(code: &str) -> Result<Self, CurrencyError> {
        let bytes = code.trim().as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(CurrencyError::InvalidCode(code.to_string()));
        }
        let mut out = [0u8; 3];
        for (dst, src) in out.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Currency(out))
    }

    /// Returns the code as a string slice.
    pub fn code(&self) -> &str {
        // Construction guarantees ASCII.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = CurrencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::new(&value)
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.code().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Currency::CAD.code(), "CAD");
        assert_eq!(Currency::USD.to_string(), "USD");
    }

    #[test]
    fn test_parse_normalises_case() {
        assert_eq!(Currency::new("eur").unwrap(), Currency::EUR);
    }

    #[test]
    fn test_rejects_bad_codes() {
        assert!(Currency::new("US").is_err());
        assert!(Currency::new("US1").is_err());
        assert!(Currency::new("USDX").is_err());
    }

    #[test]
    fn test_string_conversions() {
        assert_eq!(String::from(Currency::USD), "USD");
        assert_eq!(Currency::try_from("cad".to_string()).unwrap(), Currency::CAD);
    }
}
