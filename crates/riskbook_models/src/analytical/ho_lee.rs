//! Ho-Lee short-rate lattice for callable bonds.
//!
//! The lattice steps through the remaining coupon dates. From a node with
//! rate `r`, the next step's rates are `r + μΔt + σ√Δt` (up) for every node
//! and `r + μΔt − σ√Δt` (down) for the bottom node, floored at zero. The
//! bond is valued backward as `coupon + ½(V_up + V_down) / (1 + r)^Δt`,
//! capped by the call strike where the issuer may call.

use riskbook_core::types::Date;
use serde::{Deserialize, Serialize};

use super::error::AnalyticalError;

/// Issuer call right: redeem at `strike` on or after `date`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CallProvision {
    /// First date the call applies
    pub date: Date,
    /// Redemption price
    pub strike: f64,
}

/// When a scheduled call may be exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CallExercise {
    /// Only at the coupon date the call maps to.
    #[default]
    Bermudan,
    /// At the mapped coupon date and every one after it.
    American,
}

/// Maps call provisions onto lattice steps.
///
/// Step `k` (1-based) is `coupon_dates[k − 1]`; the result has one entry per
/// step plus the root at index 0. A call binds at the first coupon date on
/// or after its date. Bermudan calls dated on or before `valuation` have
/// lapsed; American calls dated then bind from the first step. Where calls
/// overlap, the later call's strike wins.
///
/// # Examples
/// ```
/// use riskbook_core::types::Date;
/// use riskbook_models::analytical::{CallExercise, CallProvision};
/// use riskbook_models::analytical::ho_lee::strikes_by_step;
///
/// let d = |y, m| Date::from_ymd(y, m, 1).unwrap();
/// let coupons = [d(2018, 1), d(2019, 1), d(2020, 1), d(2021, 1)];
/// let calls = [CallProvision { date: d(2018, 6), strike: 101.0 }];
///
/// let bermudan = strikes_by_step(&coupons, d(2017, 6), &calls, CallExercise::Bermudan);
/// assert_eq!(bermudan, vec![None, None, Some(101.0), None, None]);
///
/// let american = strikes_by_step(&coupons, d(2017, 6), &calls, CallExercise::American);
/// assert_eq!(american, vec![None, None, Some(101.0), Some(101.0), Some(101.0)]);
/// ```
pub fn strikes_by_step(
    coupon_dates: &[Date],
    valuation: Date,
    calls: &[CallProvision],
    exercise: CallExercise,
) -> Vec<Option<f64>> {
    let n = coupon_dates.len();
    let mut strikes = vec![None; n + 1];
    let mut ordered: Vec<&CallProvision> = calls.iter().collect();
    ordered.sort_by_key(|c| c.date);

    for call in ordered {
        if exercise == CallExercise::Bermudan && call.date <= valuation {
            continue;
        }
        let Some(idx) = coupon_dates.iter().position(|d| *d >= call.date) else {
            continue;
        };
        let step = idx + 1;
        match exercise {
            CallExercise::Bermudan => strikes[step] = Some(call.strike),
            CallExercise::American => {
                for slot in &mut strikes[step..] {
                    *slot = Some(call.strike);
                }
            }
        }
    }
    strikes
}

/// Ho-Lee lattice parameters.
///
/// # Examples
/// ```
/// use riskbook_models::analytical::HoLee;
///
/// let lattice = HoLee::new(0.03, 0.0, 0.0);
/// let steps = [1.0, 1.0, 1.0];
/// let strikes = [None; 4];
///
/// // With no volatility or drift the lattice is a flat 3% annual curve.
/// let value = lattice.callable_bond(&steps, 5.0, 100.0, &strikes).unwrap();
/// let bullet = 5.0 / 1.03 + 5.0 / 1.03_f64.powi(2) + 105.0 / 1.03_f64.powi(3);
/// assert!((value - bullet).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoLee {
    short_rate: f64,
    drift: f64,
    volatility: f64,
}

impl HoLee {
    /// Lattice starting at `short_rate` with additive `drift` and
    /// `volatility` per year.
    pub fn new(short_rate: f64, drift: f64, volatility: f64) -> Self {
        Self {
            short_rate,
            drift,
            volatility,
        }
    }

    /// Values a bond paying `coupon` at every step and `face` at the last.
    ///
    /// `step_lengths[k]` is the year fraction from step `k` to step `k + 1`;
    /// `strikes` has one entry per step including the root, and caps the
    /// node value at steps strictly between the root and maturity. No
    /// remaining steps means the bond has matured and is worth nothing.
    ///
    /// # Errors
    /// - `NumericalInstability` if `strikes` does not cover every step or a
    ///   step length is not positive
    pub fn callable_bond(
        &self,
        step_lengths: &[f64],
        coupon: f64,
        face: f64,
        strikes: &[Option<f64>],
    ) -> Result<f64, AnalyticalError> {
        let n = step_lengths.len();
        if n == 0 {
            return Ok(0.0);
        }
        if strikes.len() != n + 1 {
            return Err(AnalyticalError::NumericalInstability {
                message: format!("{} strikes for {} lattice steps", strikes.len(), n),
            });
        }
        if let Some(dt) = step_lengths.iter().find(|dt| !(**dt > 0.0)) {
            return Err(AnalyticalError::NumericalInstability {
                message: format!("non-positive lattice step {}", dt),
            });
        }

        // rates[k] holds the k + 1 short rates in force from step k to k + 1.
        let mut rates: Vec<Vec<f64>> = Vec::with_capacity(n);
        rates.push(vec![self.short_rate.max(0.0)]);
        for k in 1..n {
            let dt = step_lengths[k - 1];
            let drift = self.drift * dt;
            let shock = self.volatility * dt.sqrt();
            let prev = &rates[k - 1];
            let mut level: Vec<f64> = prev.iter().map(|r| (r + drift + shock).max(0.0)).collect();
            level.push((prev[k - 1] + drift - shock).max(0.0));
            rates.push(level);
        }

        let mut values = vec![face + coupon; n + 1];
        for k in (0..n).rev() {
            let dt = step_lengths[k];
            let paid = if k == 0 { 0.0 } else { coupon };
            for j in 0..=k {
                let continuation = 0.5 * (values[j] + values[j + 1]) / (1.0 + rates[k][j]).powf(dt);
                let node = paid + continuation;
                values[j] = match strikes[k] {
                    Some(strike) if k > 0 => node.min(strike),
                    _ => node,
                };
            }
        }
        Ok(values[0])
    }
}
