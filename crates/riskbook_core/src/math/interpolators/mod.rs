//! Interpolation utilities for term structures and surfaces.
//!
//! Both interpolators extrapolate flat: values beyond the data range are the
//! nearest edge value. Term structures are combined additively after being
//! projected onto the common [`KEY_RATE_TENORS`] grid.

mod bilinear;
mod key_rates;
mod linear;

pub use bilinear::BilinearInterpolator;
pub use key_rates::{onto_key_rates, KEY_RATE_TENORS};
pub use linear::{interpolate_flat, LinearInterpolator};

use num_traits::Float;

/// One-dimensional interpolation contract.
pub trait Interpolator<T: Float> {
    /// Value at `x`. Never fails; out-of-range targets use the edge value.
    fn interpolate(&self, x: T) -> T;

    /// Smallest and largest abscissa in the data.
    fn domain(&self) -> (T, T);
}
