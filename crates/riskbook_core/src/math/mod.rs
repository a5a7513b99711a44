//! Numerical building blocks.
//!
//! - `interpolators`: linear and bilinear interpolation with flat extrapolation
//! - `linalg`: dense symmetric matrices, Cholesky and PSD repair
//! - `distributions`: standard normal pdf, cdf and quantile

pub mod distributions;
pub mod error;
pub mod interpolators;
pub mod linalg;

pub use error::{InterpolationError, LinalgError};
