//! Bond cash flows and their present value.
//!
//! Yields are read off a curve at each cash flow time and compounded
//! `compounding` times a year: `DF(t) = (1 + y(t)/f)^(−f·t)`.

use riskbook_core::market::Curve;

use crate::schedules::{Frequency, Schedule};

/// A single dated payment, timed in years from the valuation date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlow {
    /// Years from the valuation date
    pub time: f64,
    /// Amount paid
    pub amount: f64,
}

/// Discount factor for yield `rate` over `time` years, compounded
/// `compounding` times a year.
///
/// # Examples
/// ```
/// use riskbook_models::analytical::bonds::discount_factor;
///
/// assert!((discount_factor(0.05, 1.0, 1.0) - 1.0 / 1.05).abs() < 1e-15);
/// assert!((discount_factor(0.05, 0.5, 2.0) - 1.0 / 1.025).abs() < 1e-15);
/// assert_eq!(discount_factor(0.05, 0.0, 2.0), 1.0);
/// ```
#[inline]
pub fn discount_factor(rate: f64, time: f64, compounding: f64) -> f64 {
    (1.0 + rate / compounding).powf(-compounding * time)
}

/// Sum of cash flows discounted on `curve`.
pub fn present_value(flows: &[CashFlow], curve: &Curve, compounding: f64) -> f64 {
    flows
        .iter()
        .map(|cf| cf.amount * discount_factor(curve.value_at(cf.time), cf.time, compounding))
        .sum()
}

/// Coupons of `coupon_rate_pct / 100 / f · face` on every remaining date
/// plus face value at the last one. Empty once the bond has matured.
pub fn fixed_coupon_flows(
    schedule: &Schedule,
    face: f64,
    coupon_rate_pct: f64,
    frequency: Frequency,
) -> Vec<CashFlow> {
    let coupon = coupon_rate_pct / 100.0 / frequency.per_year() * face;
    with_principal(
        schedule.times().iter().map(|&time| CashFlow {
            time,
            amount: coupon,
        }),
        face,
    )
}

/// Fixed-coupon bond price, discounting at the coupon frequency.
///
/// # Examples
/// ```
/// use riskbook_core::market::Curve;
/// use riskbook_core::types::{Date, DayCount};
/// use riskbook_models::analytical::bonds::fixed_coupon_bond;
/// use riskbook_models::schedules::{Frequency, Schedule};
///
/// let val = Date::from_ymd(2017, 4, 1).unwrap();
/// let schedule = Schedule::coupons(
///     Date::from_ymd(2017, 10, 1).unwrap(),
///     Date::from_ymd(2022, 4, 1).unwrap(),
///     Frequency::SemiAnnual,
///     val,
///     DayCount::Thirty360,
/// )
/// .unwrap();
///
/// let par = fixed_coupon_bond(&schedule, 100.0, 4.0, Frequency::SemiAnnual, &Curve::flat(0.04));
/// assert!((par - 100.0).abs() < 1e-9);
/// ```
pub fn fixed_coupon_bond(
    schedule: &Schedule,
    face: f64,
    coupon_rate_pct: f64,
    frequency: Frequency,
    curve: &Curve,
) -> f64 {
    let flows = fixed_coupon_flows(schedule, face, coupon_rate_pct, frequency);
    present_value(&flows, curve, frequency.per_year())
}

/// Zero-coupon bond: face value at `time` years, compounded annually.
/// Worth nothing once matured.
pub fn zero_coupon_bond(face: f64, time: f64, curve: &Curve) -> f64 {
    if time <= 0.0 {
        return 0.0;
    }
    face * discount_factor(curve.value_at(time), time, 1.0)
}

/// Annually compounded forward rates between consecutive payment times.
///
/// `fwd_0 = z(t_0)` and
/// `fwd_i = ((1 + z_i)^{t_i} / (1 + z_{i−1})^{t_{i−1}})^{1/(t_i − t_{i−1})} − 1`,
/// with `z` the reference zero curve. Forwards are floored at zero.
pub fn forward_rates(times: &[f64], reference: &Curve) -> Vec<f64> {
    let zeros: Vec<f64> = times.iter().map(|&t| reference.value_at(t)).collect();
    let mut out = Vec::with_capacity(times.len());
    for (i, (&t, &z)) in times.iter().zip(&zeros).enumerate() {
        let fwd = if i == 0 {
            z
        } else {
            let (t_prev, z_prev) = (times[i - 1], zeros[i - 1]);
            let growth = (1.0 + z).powf(t) / (1.0 + z_prev).powf(t_prev);
            growth.powf(1.0 / (t - t_prev)) - 1.0
        };
        out.push(fwd.max(0.0));
    }
    out
}

/// Floating-rate note: coupons `face · fwd_i / f` projected off
/// `reference`, face value at maturity, all discounted on `discount`.
pub fn floating_rate_note(
    schedule: &Schedule,
    face: f64,
    frequency: Frequency,
    discount: &Curve,
    reference: &Curve,
) -> f64 {
    let f = frequency.per_year();
    let forwards = forward_rates(schedule.times(), reference);
    let flows = with_principal(
        schedule
            .times()
            .iter()
            .zip(forwards)
            .map(|(&time, fwd)| CashFlow {
                time,
                amount: face * fwd / f,
            }),
        face,
    );
    present_value(&flows, discount, f)
}

fn with_principal(coupons: impl Iterator<Item = CashFlow>, face: f64) -> Vec<CashFlow> {
    let mut flows: Vec<CashFlow> = coupons.collect();
    if let Some(last) = flows.last_mut() {
        last.amount += face;
    }
    flows
}
