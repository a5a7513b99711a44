//! Pricing library: closed-form and lattice valuation routines.
//!
//! This module provides:
//! - Bond cash flow discounting, zero-coupon and floating-rate notes ([`bonds`])
//! - Black-Scholes-Merton with Greeks, implied volatility and implied strike
//! - Cox-Ross-Rubinstein binomial lattice for American exercise
//! - Ho-Lee short-rate lattice for callable bonds
//! - CDS premium and protection legs under a flat hazard rate
//!
//! The routines take plain numbers, schedules and curves. Resolving those
//! from a market environment is the job of the instruments.

pub mod binomial;
pub mod black_scholes;
pub mod bonds;
pub mod cds;
pub mod error;
pub mod ho_lee;

use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use binomial::{BinomialTree, LatticeResult};
pub use black_scholes::{BlackScholes, Greeks};
pub use bonds::CashFlow;
pub use cds::CdsLegs;
pub use error::AnalyticalError;
pub use ho_lee::{CallExercise, CallProvision, HoLee};

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    /// Right to buy.
    #[serde(alias = "call", alias = "CALL")]
    Call,
    /// Right to sell.
    #[serde(alias = "put", alias = "PUT")]
    Put,
}

impl OptionType {
    /// +1 for calls, −1 for puts.
    #[inline]
    pub fn sign<T: Float>(&self) -> T {
        match self {
            OptionType::Call => T::one(),
            OptionType::Put => -T::one(),
        }
    }

    /// Exercise value `max(η·(S − K), 0)`.
    #[inline]
    pub fn intrinsic<T: Float>(&self, spot: T, strike: T) -> T {
        (self.sign::<T>() * (spot - strike)).max(T::zero())
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "Call"),
            OptionType::Put => write!(f, "Put"),
        }
    }
}

/// Option exercise style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExerciseStyle {
    /// Exercise at expiry only.
    #[default]
    #[serde(alias = "european")]
    European,
    /// Exercise at any time up to expiry.
    #[serde(alias = "american")]
    American,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic() {
        assert_eq!(OptionType::Call.intrinsic(110.0, 100.0), 10.0);
        assert_eq!(OptionType::Call.intrinsic(90.0, 100.0), 0.0);
        assert_eq!(OptionType::Put.intrinsic(90.0, 100.0), 10.0);
        assert_eq!(OptionType::Put.sign::<f64>(), -1.0);
    }

    #[test]
    fn test_serde_aliases() {
        let kind: OptionType = serde_json::from_str("\"put\"").unwrap();
        assert_eq!(kind, OptionType::Put);
        let style: ExerciseStyle = serde_json::from_str("\"american\"").unwrap();
        assert_eq!(style, ExerciseStyle::American);
    }
}
