//! Credit default swap legs under a flat hazard rate.
//!
//! Survival to `t` is `exp(−h·t)` and cash flows are discounted at the
//! annually compounded zero rate `(1 + y(t))^(−t)`, with `y` floored at zero.

use riskbook_core::market::Curve;

use crate::schedules::Frequency;

/// Present values of the two legs, seen from the protection buyer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdsLegs {
    /// Spread payments made while the reference entity survives
    pub premium: f64,
    /// Loss-given-default payments received on default
    pub protection: f64,
}

impl CdsLegs {
    /// Value to the protection buyer: protection minus premium.
    pub fn value(&self) -> f64 {
        self.protection - self.premium
    }
}

/// Prices both legs over the remaining premium `times`.
///
/// Each period pays `notional · (1/f) · spread_bps / 1e4` if the entity has
/// survived to its end. Protection pays `notional · (1 − recovery)` times
/// the default probability within the period, the first period starting at
/// zero when it is shorter than `1/f`.
///
/// # Examples
/// ```
/// use riskbook_core::market::Curve;
/// use riskbook_models::analytical::cds::cds_legs;
/// use riskbook_models::schedules::Frequency;
///
/// let times = [0.25, 0.5, 0.75, 1.0];
/// let legs = cds_legs(&times, Frequency::Quarterly, 100.0, 1e5, 0.4, 0.0, &Curve::flat(0.02));
///
/// assert_eq!(legs.protection, 0.0);
/// assert!(legs.premium > 980.0 && legs.premium < 1000.0);
/// ```
pub fn cds_legs(
    times: &[f64],
    frequency: Frequency,
    spread_bps: f64,
    notional: f64,
    recovery: f64,
    hazard: f64,
    curve: &Curve,
) -> CdsLegs {
    let period = frequency.period_length();
    let loss = notional * (1.0 - recovery);
    let coupon = notional * period * spread_bps / 1e4;

    let mut legs = CdsLegs {
        premium: 0.0,
        protection: 0.0,
    };
    for &t in times {
        let df = (1.0 + curve.value_at(t).max(0.0)).powf(-t);
        let survival = (-hazard * t).exp();
        let start = (t - period).max(0.0);
        let default_prob = (-hazard * start).exp() - survival;

        legs.premium += coupon * survival * df;
        legs.protection += loss * default_prob * df;
    }
    legs
}

/// Flat hazard rate implied by a spread and recovery: `s / (1 − R)`.
pub fn implied_hazard(spread_bps: f64, recovery: f64) -> f64 {
    spread_bps / 1e4 / (1.0 - recovery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fair_spread_roughly_balances_legs() {
        let times: Vec<f64> = (1..=20).map(|i| i as f64 * 0.25).collect();
        let hazard = implied_hazard(150.0, 0.4);
        let legs = cds_legs(&times, Frequency::Quarterly, 150.0, 1e6, 0.4, hazard, &Curve::flat(0.03));
        assert!(legs.value().abs() / legs.premium < 0.01);
    }

    #[test]
    fn test_protection_grows_with_hazard() {
        let times = [0.5, 1.0, 1.5, 2.0];
        let curve = Curve::flat(0.02);
        let low = cds_legs(&times, Frequency::SemiAnnual, 100.0, 1e5, 0.4, 0.01, &curve);
        let high = cds_legs(&times, Frequency::SemiAnnual, 100.0, 1e5, 0.4, 0.05, &curve);
        assert!(high.protection > low.protection);
        assert!(high.premium < low.premium);
    }

    #[test]
    fn test_short_first_period_starts_at_zero() {
        let curve = Curve::flat(0.0);
        let legs = cds_legs(&[0.1], Frequency::Quarterly, 0.0, 100.0, 0.0, 0.2, &curve);
        assert_relative_eq!(legs.protection, 100.0 * (1.0 - (-0.02_f64).exp()), epsilon = 1e-12);
    }

    #[test]
    fn test_negative_rates_floored() {
        let floored = cds_legs(&[1.0], Frequency::Annual, 100.0, 100.0, 0.4, 0.0, &Curve::flat(-0.01));
        assert_relative_eq!(floored.premium, 1.0);
    }
}
