//! Projection of term structures onto the canonical key-rate tenors.

use super::linear::interpolate_flat;

/// Key-rate tenors in years onto which every discounting term structure is
/// projected before risk-free, spread and idiosyncratic components are added.
pub const KEY_RATE_TENORS: [f64; 13] = [
    0.25, 0.5, 1.0, 2.0, 3.0, 4.0, 5.0, 7.0, 10.0, 15.0, 20.0, 25.0, 30.0,
];

/// Interpolates `(tenors, values)` at each key-rate tenor.
///
/// `tenors` must be strictly increasing.
///
/// # Example
///
/// ```
/// use riskbook_core::math::interpolators::{onto_key_rates, KEY_RATE_TENORS};
///
/// let projected = onto_key_rates(&[1.0, 10.0], &[0.01, 0.028]);
/// assert_eq!(projected.len(), KEY_RATE_TENORS.len());
/// assert_eq!(projected[0], 0.01);           // 0.25y, flat below 1y
/// assert!((projected[4] - 0.014).abs() < 1e-12); // 3y
/// assert_eq!(projected[12], 0.028);         // 30y, flat above 10y
/// ```
pub fn onto_key_rates(tenors: &[f64], values: &[f64]) -> [f64; 13] {
    let mut out = [0.0; 13];
    for (slot, &t) in out.iter_mut().zip(KEY_RATE_TENORS.iter()) {
        *slot = interpolate_flat(tenors, values, t);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_on_key_rate_grid() {
        let values: Vec<f64> = KEY_RATE_TENORS.iter().map(|t| 0.01 + 0.001 * t).collect();
        let projected = onto_key_rates(&KEY_RATE_TENORS, &values);
        for (a, b) in projected.iter().zip(values.iter()) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    fn test_empty_structure_projects_to_zero() {
        assert_eq!(onto_key_rates(&[], &[]), [0.0; 13]);
    }
}
