//! Structured risk factor addressing.
//!
//! Every value a scenario can move is addressed by a [`RiskFactorKey`]: a
//! category plus the lookup name and, for tabular data, the row and column
//! labels. The dash-delimited legacy form (`Curves-RiskFree-Gov-USD-0.25`)
//! is only produced and consumed at the data boundary through `FromStr` and
//! `Display`.
//!
//! # Legacy grammar
//!
//! | Form | Key |
//! |------|-----|
//! | `Constants-<name>` | constant `<name>` |
//! | `Lists-<name>-<column>` | entry of a single-row list |
//! | `Curves-<name>-<tenor>` | curve pillar |
//! | `Matrices-<name>-<row>-<column>` | matrix cell |
//! | `Surfaces-<name>-<row>-<column>` | surface cell |
//!
//! Labels may end in `-` (ratings such as `BBB-`); the empty token this leaves
//! after splitting is folded back into the label before it.
//!
//! ```
//! use riskbook_core::market::RiskFactorKey;
//!
//! let key: RiskFactorKey = "Matrices-CreditSpreads-Ratings-USD-BBB--5".parse().unwrap();
//! assert_eq!(
//!     key,
//!     RiskFactorKey::Matrix {
//!         name: "CreditSpreads-Ratings-USD".into(),
//!         row: "BBB-".into(),
//!         column: "5".into(),
//!     }
//! );
//! assert_eq!(key.to_string(), "Matrices-CreditSpreads-Ratings-USD-BBB--5");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::MarketDataError;

/// The five kinds of market data held by a `MarketEnvironment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    /// Scalar values such as stock prices and FX rates.
    Constant,
    /// Single-row labelled tables.
    List,
    /// Term structures keyed by tenor.
    Curve,
    /// Two-dimensional labelled tables.
    Matrix,
    /// Volatility surfaces (maturity × moneyness).
    Surface,
}

impl RiskCategory {
    /// All categories in storage order.
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Constant,
        RiskCategory::List,
        RiskCategory::Curve,
        RiskCategory::Matrix,
        RiskCategory::Surface,
    ];

    /// Prefix used in the legacy key form.
    pub fn prefix(&self) -> &'static str {
        match self {
            RiskCategory::Constant => "Constants",
            RiskCategory::List => "Lists",
            RiskCategory::Curve => "Curves",
            RiskCategory::Matrix => "Matrices",
            RiskCategory::Surface => "Surfaces",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        RiskCategory::ALL.into_iter().find(|c| c.prefix() == prefix)
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Address of a single market data value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RiskFactorKey {
    /// A named constant.
    Constant {
        /// Constant name, e.g. `FXRates-USDCAD`
        name: String,
    },
    /// One column of a list.
    List {
        /// List name, e.g. `RecoveryRates`
        name: String,
        /// Column label
        column: String,
    },
    /// One pillar of a curve.
    Curve {
        /// Curve name, e.g. `RiskFree-Gov-CAD`
        name: String,
        /// Tenor label in years, e.g. `0.25`
        tenor: String,
    },
    /// One cell of a matrix.
    Matrix {
        /// Matrix name
        name: String,
        /// Row label
        row: String,
        /// Column label
        column: String,
    },
    /// One cell of a surface.
    Surface {
        /// Surface name
        name: String,
        /// Row label (maturity)
        row: String,
        /// Column label (moneyness)
        column: String,
    },
}

impl RiskFactorKey {
    /// Key of a constant.
    pub fn constant(name: impl Into<String>) -> Self {
        RiskFactorKey::Constant { name: name.into() }
    }

    /// Key of a list column.
    pub fn list(name: impl Into<String>, column: impl Into<String>) -> Self {
        RiskFactorKey::List {
            name: name.into(),
            column: column.into(),
        }
    }

    /// Key of a curve pillar; the tenor is rendered as its shortest decimal form.
    pub fn curve(name: impl Into<String>, tenor: f64) -> Self {
        RiskFactorKey::Curve {
            name: name.into(),
            tenor: format_tenor(tenor),
        }
    }

    /// Key of a matrix cell.
    pub fn matrix(
        name: impl Into<String>,
        row: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        RiskFactorKey::Matrix {
            name: name.into(),
            row: row.into(),
            column: column.into(),
        }
    }

    /// Key of a surface cell.
    pub fn surface(
        name: impl Into<String>,
        row: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        RiskFactorKey::Surface {
            name: name.into(),
            row: row.into(),
            column: column.into(),
        }
    }

    /// Category of the addressed value.
    pub fn category(&self) -> RiskCategory {
        match self {
            RiskFactorKey::Constant { .. } => RiskCategory::Constant,
            RiskFactorKey::List { .. } => RiskCategory::List,
            RiskFactorKey::Curve { .. } => RiskCategory::Curve,
            RiskFactorKey::Matrix { .. } => RiskCategory::Matrix,
            RiskFactorKey::Surface { .. } => RiskCategory::Surface,
        }
    }

    /// Name of the containing entry in the environment.
    pub fn name(&self) -> &str {
        match self {
            RiskFactorKey::Constant { name }
            | RiskFactorKey::List { name, .. }
            | RiskFactorKey::Curve { name, .. }
            | RiskFactorKey::Matrix { name, .. }
            | RiskFactorKey::Surface { name, .. } => name,
        }
    }
}

/// Renders a tenor the way curve labels are written (`0.25`, `1`, `30`).
pub fn format_tenor(tenor: f64) -> String {
    format!("{}", tenor)
}

/// Splits on `-`, folding each empty token into the preceding one as a trailing `-`.
fn tokenize(s: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for part in s.split('-') {
        match tokens.last_mut() {
            Some(prev) if part.is_empty() => prev.push('-'),
            _ => tokens.push(part.to_string()),
        }
    }
    tokens
}

impl FromStr for RiskFactorKey {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let tokens = tokenize(s);
        if tokens.len() < 2 || tokens.iter().any(|t| t.is_empty()) {
            return Err(MarketDataError::InvalidKey(s.to_string()));
        }
        let n = tokens.len();
        let join = |range: std::ops::Range<usize>| tokens[range].join("-");

        let category = RiskCategory::from_prefix(&tokens[0]);
        let key = match category {
            Some(RiskCategory::List) | Some(RiskCategory::Curve) => {
                if n < 3 {
                    return Err(MarketDataError::InvalidKey(s.to_string()));
                }
                let name = join(1..n - 1);
                let label = tokens[n - 1].clone();
                if category == Some(RiskCategory::List) {
                    RiskFactorKey::List {
                        name,
                        column: label,
                    }
                } else {
                    RiskFactorKey::Curve { name, tenor: label }
                }
            }
            Some(RiskCategory::Matrix) | Some(RiskCategory::Surface) => {
                if n < 4 {
                    return Err(MarketDataError::InvalidKey(s.to_string()));
                }
                let name = join(1..n - 2);
                let row = tokens[n - 2].clone();
                let column = tokens[n - 1].clone();
                if category == Some(RiskCategory::Matrix) {
                    RiskFactorKey::Matrix { name, row, column }
                } else {
                    RiskFactorKey::Surface { name, row, column }
                }
            }
            // Constants, and any unrecognised prefix
            _ => RiskFactorKey::Constant { name: join(1..n) },
        };
        Ok(key)
    }
}

impl fmt::Display for RiskFactorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = self.category().prefix();
        match self {
            RiskFactorKey::Constant { name } => write!(f, "{}-{}", prefix, name),
            RiskFactorKey::List { name, column } => write!(f, "{}-{}-{}", prefix, name, column),
            RiskFactorKey::Curve { name, tenor } => write!(f, "{}-{}-{}", prefix, name, tenor),
            RiskFactorKey::Matrix { name, row, column }
            | RiskFactorKey::Surface { name, row, column } => {
                write!(f, "{}-{}-{}-{}", prefix, name, row, column)
            }
        }
    }
}

impl TryFrom<String> for RiskFactorKey {
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RiskFactorKey> for String {
    fn from(value: RiskFactorKey) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_curve() {
        let key: RiskFactorKey = "Curves-RiskFree-Gov-CAD-0.25".parse().unwrap();
        assert_eq!(key, RiskFactorKey::curve("RiskFree-Gov-CAD", 0.25));
        assert_eq!(key.category(), RiskCategory::Curve);
        assert_eq!(key.name(), "RiskFree-Gov-CAD");
    }

    #[test]
    fn test_parse_list_and_surface() {
        let key: RiskFactorKey = "Lists-RecoveryRates-Senior Unsecured".parse().unwrap();
        assert_eq!(key, RiskFactorKey::list("RecoveryRates", "Senior Unsecured"));

        let key: RiskFactorKey = "Surfaces-ImpliedVols-CAD-XYZ-0.5-1.1".parse().unwrap();
        assert_eq!(key, RiskFactorKey::surface("ImpliedVols-CAD-XYZ", "0.5", "1.1"));
    }

    #[test]
    fn test_parse_constant_forms() {
        let key: RiskFactorKey = "Constants-FXRates-USDCAD".parse().unwrap();
        assert_eq!(key, RiskFactorKey::constant("FXRates-USDCAD"));

        // unknown prefix: everything after the first token names the constant
        let key: RiskFactorKey = "Other-MarketPrice-ABC".parse().unwrap();
        assert_eq!(key, RiskFactorKey::constant("MarketPrice-ABC"));
    }

    #[test]
    fn test_trailing_dash_labels() {
        let key: RiskFactorKey = "Lists-DefaultProbability-BBB-".parse().unwrap();
        assert_eq!(key, RiskFactorKey::list("DefaultProbability", "BBB-"));
        assert_eq!(key.to_string(), "Lists-DefaultProbability-BBB-");
    }

    #[test]
    fn test_invalid_keys() {
        assert!("Curves".parse::<RiskFactorKey>().is_err());
        assert!("Curves-RiskFree".parse::<RiskFactorKey>().is_err());
        assert!("Matrices-A-B".parse::<RiskFactorKey>().is_err());
        assert!("".parse::<RiskFactorKey>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let keys = [
            RiskFactorKey::constant("MarketPrice-ABC"),
            RiskFactorKey::list("RecoveryRates", "Senior"),
            RiskFactorKey::curve("RiskFree-Gov-USD", 10.0),
            RiskFactorKey::matrix("CreditTransitionMatrix", "A+", "BB-"),
            RiskFactorKey::surface("ImpliedVols-CAD-ABC", "1", "0.9"),
        ];
        for key in keys {
            let parsed: RiskFactorKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, key);
        }
    }

    #[test]
    fn test_format_tenor() {
        assert_eq!(format_tenor(0.25), "0.25");
        assert_eq!(format_tenor(1.0), "1");
        assert_eq!(format_tenor(30.0), "30");
    }
}
