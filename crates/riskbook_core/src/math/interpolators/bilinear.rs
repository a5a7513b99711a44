//! Bilinear interpolation on a rectangular grid with edge clamping.

use super::linear::interpolate_flat;
use crate::math::InterpolationError;
use num_traits::Float;

/// Bilinear interpolator for 2D grids such as volatility surfaces.
///
/// `zs[i][j]` is the value at `(xs[i], ys[j])`. Both axes are clamped: a
/// target outside the grid is moved to the nearest edge before interpolating,
/// so the surface is never extrapolated.
///
/// # Example
///
/// ```
/// use riskbook_core::math::interpolators::BilinearInterpolator;
///
/// // maturities × moneyness
/// let xs = [0.5_f64, 1.0];
/// let ys = [0.9, 1.1];
/// let zs = vec![vec![0.30, 0.20], vec![0.26, 0.18]];
/// let surf = BilinearInterpolator::new(&xs, &ys, zs).unwrap();
///
/// assert!((surf.interpolate(0.75, 1.0) - 0.235).abs() < 1e-12);
/// assert_eq!(surf.interpolate(5.0, 2.0), 0.18);
/// ```
#[derive(Debug, Clone)]
pub struct BilinearInterpolator<T: Float> {
    xs: Vec<T>,
    ys: Vec<T>,
    zs: Vec<Vec<T>>,
}

impl<T: Float> BilinearInterpolator<T> {
    /// Construct from strictly increasing axes and a row-major grid.
    ///
    /// # Errors
    ///
    /// * `InterpolationError::InsufficientData` - an empty axis
    /// * `InterpolationError::InvalidInput` - grid shape mismatch or unsorted axis
    pub fn new(xs: &[T], ys: &[T], zs: Vec<Vec<T>>) -> Result<Self, InterpolationError> {
        if xs.is_empty() || ys.is_empty() {
            return Err(InterpolationError::InsufficientData {
                got: xs.len().min(ys.len()),
                need: 1,
            });
        }
        if zs.len() != xs.len() || zs.iter().any(|row| row.len() != ys.len()) {
            return Err(InterpolationError::InvalidInput(format!(
                "grid must be {}x{}",
                xs.len(),
                ys.len()
            )));
        }
        let increasing = |v: &[T]| v.windows(2).all(|w| w[0] < w[1]);
        if !increasing(xs) || !increasing(ys) {
            return Err(InterpolationError::InvalidInput(
                "axes must be strictly increasing".to_string(),
            ));
        }
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            zs,
        })
    }

    /// Interpolate at `(x, y)`, clamping each coordinate to the grid.
    pub fn interpolate(&self, x: T, y: T) -> T {
        let n = self.xs.len();
        let x = clamp(x, self.xs[0], self.xs[n - 1]);

        let hi = self.xs.partition_point(|&xi| xi <= x);
        if hi == 0 || hi >= n {
            // x sits on the last row (or the grid has a single row)
            let row = if hi == 0 { 0 } else { n - 1 };
            return interpolate_flat(&self.ys, &self.zs[row], y);
        }
        let lo = hi - 1;
        let z_lo = interpolate_flat(&self.ys, &self.zs[lo], y);
        let z_hi = interpolate_flat(&self.ys, &self.zs[hi], y);
        let w = (x - self.xs[lo]) / (self.xs[hi] - self.xs[lo]);
        z_lo + w * (z_hi - z_lo)
    }

    /// Row axis.
    pub fn xs(&self) -> &[T] {
        &self.xs
    }

    /// Column axis.
    pub fn ys(&self) -> &[T] {
        &self.ys
    }
}

#[inline]
fn clamp<T: Float>(v: T, lo: T, hi: T) -> T {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn surface() -> BilinearInterpolator<f64> {
        BilinearInterpolator::new(
            &[0.25, 1.0, 2.0],
            &[0.8, 1.0, 1.2],
            vec![
                vec![0.30, 0.25, 0.28],
                vec![0.26, 0.22, 0.24],
                vec![0.24, 0.20, 0.22],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_grid_points_exact() {
        let s = surface();
        assert_relative_eq!(s.interpolate(1.0, 1.0), 0.22);
        assert_relative_eq!(s.interpolate(2.0, 1.2), 0.22);
        assert_relative_eq!(s.interpolate(0.25, 0.8), 0.30);
    }

    #[test]
    fn test_interior_bilinear() {
        let s = surface();
        // midpoint of the four corners 0.26, 0.22, 0.24, 0.20
        assert_relative_eq!(s.interpolate(1.5, 0.9), 0.23, epsilon = 1e-12);
    }

    #[test]
    fn test_clamps_outside_grid() {
        let s = surface();
        assert_relative_eq!(s.interpolate(0.01, 0.5), 0.30);
        assert_relative_eq!(s.interpolate(10.0, 3.0), 0.22);
        // maturity clamped, moneyness interpolated
        assert_relative_eq!(s.interpolate(10.0, 1.1), 0.21, epsilon = 1e-12);
    }

    #[test]
    fn test_single_row() {
        let s = BilinearInterpolator::new(&[1.0], &[0.9, 1.1], vec![vec![0.2, 0.4]]).unwrap();
        assert_relative_eq!(s.interpolate(3.0, 1.0), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_validation() {
        assert!(BilinearInterpolator::new(&[1.0, 2.0], &[1.0], vec![vec![0.2]]).is_err());
        assert!(BilinearInterpolator::new(&[2.0, 1.0], &[1.0], vec![vec![0.2], vec![0.3]]).is_err());
    }
}
