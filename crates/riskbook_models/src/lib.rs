//! # riskbook_models: Instruments and Pricing Library
//!
//! ## Layer 2 (Models) Role
//!
//! riskbook_models sits on top of riskbook_core and provides:
//! - Coupon and premium schedules (`schedules`)
//! - The S&P style rating scale and rating-row resolution (`ratings`)
//! - Closed-form and lattice pricing routines (`analytical`)
//! - Instrument variants and the [`Priceable`](instruments::Priceable) contract (`instruments`)
//!
//! ## Dependencies
//!
//! - riskbook_core: dates, market environment, interpolation, normal distribution
//! - num-traits: generic Black-Scholes formulas
//! - serde: instrument definitions are loaded from JSON records
//! - thiserror: error enums per concern
//! - tracing: warnings for conservative rating fallbacks
//!
//! ## Usage Examples
//!
//! ```rust
//! use riskbook_models::analytical::{BlackScholes, OptionType};
//!
//! let bs = BlackScholes::new(100.0_f64, 0.03, 0.0, 0.2).unwrap();
//! let call = bs.price(OptionType::Call, 100.0, 1.0);
//! let put = bs.price(OptionType::Put, 100.0, 1.0);
//!
//! let forward_gap = 100.0 - 100.0 * (-0.03_f64).exp();
//! assert!((call - put - forward_gap).abs() < 1e-10);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analytical;
pub mod instruments;
pub mod ratings;
pub mod schedules;
