//! # riskbook_core: Market Data Foundation
//!
//! ## Layer 1 (Foundation) Role
//!
//! riskbook_core is the bottom layer of the riskbook workspace, providing:
//! - Time types: `Date`, `DayCount` (`types::time`)
//! - Currency codes: `Currency` (`types::currency`)
//! - Market data containers: `Table`, `Curve`, `MarketEnvironment` (`market`)
//! - Structured risk factor addressing: `RiskFactorKey` (`market::key`)
//! - Interpolation onto key-rate tenors (`math::interpolators`)
//! - Dense linear algebra for covariance handling (`math::linalg`)
//! - Standard normal distribution functions (`math::distributions`)
//!
//! ## Dependencies
//!
//! Layer 1 has no dependencies on other riskbook crates:
//! - num-traits: generic interpolation over floating point types
//! - chrono: date arithmetic
//! - serde: serialisation of dates, currencies and tables
//! - tracing: diagnostics for recovered numerical conditions
//!
//! ## Usage Examples
//!
//! ```rust
//! use riskbook_core::market::{Curve, MarketEnvironment};
//! use riskbook_core::types::Date;
//!
//! let date = Date::from_ymd(2017, 6, 1).unwrap();
//! let mut env = MarketEnvironment::new("base", date);
//! env.add_constant("MarketPrice-ABC", 52.0);
//! env.add_curve(
//!     "RiskFree-Gov-CAD",
//!     Curve::new(vec![0.25, 1.0, 10.0], vec![0.010, 0.012, 0.020]).unwrap(),
//! );
//!
//! assert_eq!(env.get_constant("MarketPrice-ABC").unwrap(), 52.0);
//! assert!(env.get_curve("RiskFree-Gov-USD").is_err());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market;
pub mod math;
pub mod types;
