//! Term structures keyed by tenor.

use serde::{Deserialize, Serialize};

use super::error::MarketDataError;
use super::key::format_tenor;
use crate::math::interpolators::{interpolate_flat, onto_key_rates, KEY_RATE_TENORS};

/// Tolerance for matching a tenor label against a pillar.
const TENOR_MATCH_TOLERANCE: f64 = 1e-9;

/// Yield or spread curve: pillars `(tenor in years, value)`.
///
/// Values between pillars are linear, values outside are flat.
///
/// # Examples
///
/// ```
/// use riskbook_core::market::Curve;
///
/// let curve = Curve::new(vec![1.0, 5.0], vec![0.02, 0.04]).unwrap();
/// assert!((curve.value_at(3.0) - 0.03).abs() < 1e-12);
/// assert_eq!(curve.value_at(0.25), 0.02);
/// assert_eq!(curve.pillar_index("5"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurveRepr", into = "CurveRepr")]
pub struct Curve {
    tenors: Vec<f64>,
    values: Vec<f64>,
}

/// Serialised form of a curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveRepr {
    tenors: Vec<f64>,
    values: Vec<f64>,
}

impl Curve {
    /// Builds a curve from strictly increasing tenors and matching values.
    pub fn new(tenors: Vec<f64>, values: Vec<f64>) -> Result<Self, MarketDataError> {
        if tenors.is_empty() || tenors.len() != values.len() {
            return Err(MarketDataError::InvalidTable(format!(
                "curve needs matching non-empty tenors and values, got {} and {}",
                tenors.len(),
                values.len()
            )));
        }
        if tenors.iter().chain(&values).any(|v| !v.is_finite()) {
            return Err(MarketDataError::InvalidTable(
                "curve contains non-finite data".to_string(),
            ));
        }
        if tenors.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MarketDataError::InvalidTable(
                "curve tenors must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { tenors, values })
    }

    /// Curve with the same value at every key-rate tenor.
    pub fn flat(value: f64) -> Self {
        Self {
            tenors: KEY_RATE_TENORS.to_vec(),
            values: vec![value; KEY_RATE_TENORS.len()],
        }
    }

    /// Pillar tenors in years.
    pub fn tenors(&self) -> &[f64] {
        &self.tenors
    }

    /// Pillar values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of the shortest pillar.
    pub fn first_value(&self) -> f64 {
        self.values[0]
    }

    /// Interpolated value at `tenor` years.
    pub fn value_at(&self, tenor: f64) -> f64 {
        interpolate_flat(&self.tenors, &self.values, tenor)
    }

    /// The curve sampled on the canonical key-rate tenors.
    pub fn on_key_rates(&self) -> [f64; 13] {
        onto_key_rates(&self.tenors, &self.values)
    }

    /// Pillar whose tenor equals the numeric value of `label`.
    pub fn pillar_index(&self, label: &str) -> Option<usize> {
        let tenor: f64 = label.trim().parse().ok()?;
        self.tenors
            .iter()
            .position(|t| (t - tenor).abs() < TENOR_MATCH_TOLERANCE)
    }

    /// Value at the pillar labelled `label`.
    pub fn pillar_value(&self, label: &str) -> Option<f64> {
        self.pillar_index(label).map(|i| self.values[i])
    }

    /// Overwrites the pillar labelled `label`; `false` when no pillar matches.
    pub fn set_pillar(&mut self, label: &str, value: f64) -> bool {
        match self.pillar_index(label) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// Pillar labels as written in risk factor keys.
    pub fn labels(&self) -> impl Iterator<Item = String> + '_ {
        self.tenors.iter().map(|&t| format_tenor(t))
    }

    /// Curve with `f` applied to every value.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            tenors: self.tenors.clone(),
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }
}

impl TryFrom<CurveRepr> for Curve {
    type Error = MarketDataError;

    fn try_from(repr: CurveRepr) -> Result<Self, Self::Error> {
        Curve::new(repr.tenors, repr.values)
    }
}

impl From<Curve> for CurveRepr {
    fn from(curve: Curve) -> Self {
        CurveRepr {
            tenors: curve.tenors,
            values: curve.values,
        }
    }
}
