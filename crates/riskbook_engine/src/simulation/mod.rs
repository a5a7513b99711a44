//! Monte Carlo scenario generation.
//!
//! Correlated factor moves are drawn from a multivariate normal with
//! covariance `D·C·D`, where `C` is the factor correlation matrix and
//! `D = diag(σ)`. Independent standard normals are mapped through the lower
//! Cholesky factor of the covariance; a covariance that is not positive
//! definite is repaired to the nearest positive semi-definite matrix first.
//!
//! Each path draws from its own `StdRng` seeded with `seed + path`, so the
//! output does not depend on how paths are spread over threads.

mod engine;
mod error;

pub use engine::{SimulationEngine, SimulationSettings, CORRELATION_MATRIX};
pub use error::SimulationError;
