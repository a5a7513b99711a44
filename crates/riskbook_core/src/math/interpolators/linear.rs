//! Piecewise linear interpolation with flat extrapolation.

use super::Interpolator;
use crate::math::InterpolationError;
use num_traits::Float;

/// Piecewise linear interpolator.
///
/// Stores sorted (x, y) pairs. Targets at or below the first abscissa return
/// the first value and targets at or above the last abscissa return the last
/// value; anything in between is linear in the bracketing segment.
///
/// # Construction
///
/// Data points are sorted by x during construction. A single point is
/// accepted and yields a constant function.
///
/// # Example
///
/// ```
/// use riskbook_core::math::interpolators::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::new(&[1.0_f64, 2.0, 5.0], &[0.01, 0.02, 0.05]).unwrap();
/// assert!((interp.interpolate(1.5) - 0.015).abs() < 1e-12);
/// assert_eq!(interp.interpolate(0.25), 0.01);
/// assert_eq!(interp.interpolate(30.0), 0.05);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
}

impl<T: Float> LinearInterpolator<T> {
    /// Construct from x and y data points.
    ///
    /// # Errors
    ///
    /// * `InterpolationError::InvalidInput` - mismatched lengths, non-finite or duplicate x
    /// * `InterpolationError::InsufficientData` - no points
    pub fn new(xs: &[T], ys: &[T]) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::InvalidInput(format!(
                "xs and ys must have same length: got {} and {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.is_empty() {
            return Err(InterpolationError::InsufficientData { got: 0, need: 1 });
        }
        if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
            return Err(InterpolationError::InvalidInput(
                "non-finite data point".to_string(),
            ));
        }

        let mut pairs: Vec<(T, T)> = xs.iter().copied().zip(ys.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(InterpolationError::InvalidInput(
                "duplicate abscissa".to_string(),
            ));
        }

        let (xs, ys): (Vec<T>, Vec<T>) = pairs.into_iter().unzip();
        Ok(Self { xs, ys })
    }

    /// Sorted abscissae.
    #[inline]
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Ordinates in abscissa order.
    #[inline]
    pub fn ys(&self) -> &[T] {
        &self.ys
    }
}

impl<T: Float> Interpolator<T> for LinearInterpolator<T> {
    fn interpolate(&self, x: T) -> T {
        interpolate_flat(&self.xs, &self.ys, x)
    }

    fn domain(&self) -> (T, T) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }
}

/// Linear interpolation over sorted, non-empty slices with flat extrapolation.
///
/// The caller guarantees `xs` is strictly increasing and `xs.len() == ys.len()`.
/// Empty input returns zero.
pub fn interpolate_flat<T: Float>(xs: &[T], ys: &[T], x: T) -> T {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return T::zero();
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[n - 1] {
        return ys[n - 1];
    }

    // partition_point gives the first index with xs[i] > x, which is in 1..n
    let hi = xs[..n].partition_point(|&xi| xi <= x);
    let lo = hi - 1;
    let w = (x - xs[lo]) / (xs[hi] - xs[lo]);
    ys[lo] + w * (ys[hi] - ys[lo])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_sorts_input() {
        let interp = LinearInterpolator::new(&[3.0, 1.0, 2.0], &[30.0, 10.0, 20.0]).unwrap();
        assert_eq!(interp.xs(), &[1.0, 2.0, 3.0]);
        assert_eq!(interp.ys(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_interior_points() {
        let interp = LinearInterpolator::new(&[0.25, 1.0, 10.0], &[0.01, 0.02, 0.05]).unwrap();
        assert_relative_eq!(interp.interpolate(0.625), 0.015, epsilon = 1e-15);
        assert_relative_eq!(interp.interpolate(5.5), 0.035, epsilon = 1e-15);
        assert_relative_eq!(interp.interpolate(1.0), 0.02, epsilon = 1e-15);
    }

    #[test]
    fn test_flat_extrapolation() {
        let interp = LinearInterpolator::new(&[1.0, 2.0], &[5.0, 7.0]).unwrap();
        assert_eq!(interp.interpolate(-3.0), 5.0);
        assert_eq!(interp.interpolate(100.0), 7.0);
    }

    #[test]
    fn test_single_point_is_constant() {
        let interp = LinearInterpolator::new(&[2.0], &[0.03]).unwrap();
        assert_eq!(interp.interpolate(0.1), 0.03);
        assert_eq!(interp.interpolate(40.0), 0.03);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(LinearInterpolator::<f64>::new(&[], &[]).is_err());
        assert!(LinearInterpolator::new(&[1.0, 2.0], &[1.0]).is_err());
        assert!(LinearInterpolator::new(&[1.0, 1.0], &[1.0, 2.0]).is_err());
        assert!(LinearInterpolator::new(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
    }

    proptest! {
        #[test]
        fn test_flat_curve_returns_constant(
            rate in -0.05f64..0.2,
            target in -10.0f64..60.0,
        ) {
            let tenors = [0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0];
            let values = [rate; 7];
            let interp = LinearInterpolator::new(&tenors, &values).unwrap();
            prop_assert_eq!(interp.interpolate(target), rate);
        }

        #[test]
        fn test_stays_within_data_range(target in -5.0f64..50.0) {
            let interp = LinearInterpolator::new(&[0.5, 3.0, 20.0], &[0.04, 0.01, 0.03]).unwrap();
            let v = interp.interpolate(target);
            prop_assert!((0.01..=0.04).contains(&v));
        }
    }
}
