//! Market data containers and risk factor addressing.
//!
//! - [`MarketEnvironment`]: constants, lists, curves, matrices and surfaces for one date
//! - [`Table`] and [`Curve`]: the stored values
//! - [`RiskFactorKey`]: structured address of a single value

mod curve;
mod environment;
mod error;
pub mod key;
mod table;

pub use curve::Curve;
pub use environment::MarketEnvironment;
pub use error::MarketDataError;
pub use key::{RiskCategory, RiskFactorKey};
pub use table::Table;
