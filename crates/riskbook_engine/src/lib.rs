//! # riskbook_engine: Portfolio Risk Engine
//!
//! ## Layer 3 (Risk) Role
//!
//! riskbook_engine turns instruments and market data into risk numbers:
//! - Recursive portfolios with FX conversion and sub-portfolio views (`portfolio`)
//! - Market environment perturbation, presets, historical selection and
//!   bump-and-revalue sensitivities (`scenarios`)
//! - Correlated normal scenario generation with covariance repair (`simulation`)
//! - VaR/ES, marginal VaR, credit migration VaR, back-testing and capital (`risk`)
//! - Run configuration and data loading (`config`, `loader`)
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │  DataLoader  │──▶│  Portfolio   │───────────────┐
//! └──────┬───────┘   └──────────────┘               │
//!        │ MarketEnvironment                        ▼
//!        ▼                                  ┌───────────────┐
//! ┌──────────────┐   ┌──────────────┐       │  revaluation  │
//! │  Simulation  │──▶│  Scenarios   │──────▶│  (rayon)      │
//! └──────────────┘   └──────────────┘       └───────┬───────┘
//!                                                   │ P&L
//!                                                   ▼
//!                                           ┌───────────────┐
//!                                           │ VaR / ES /    │
//!                                           │ marginal /    │
//!                                           │ credit / cap. │
//!                                           └───────────────┘
//! ```
//!
//! ## Dependencies
//!
//! - riskbook_core, riskbook_models: market data and instrument valuation
//! - rand, rand_distr: seeded normal draws
//! - rayon: parallel revaluation over scenarios and simulation paths
//! - serde, serde_json, toml, csv: configuration and data files
//! - thiserror: error enums per concern
//! - tracing: pipeline stage logging
//!
//! ## Usage Examples
//!
//! ```rust
//! use riskbook_core::market::MarketEnvironment;
//! use riskbook_core::types::{Currency, Date};
//! use riskbook_engine::portfolio::Portfolio;
//! use riskbook_engine::risk::var_from_pnl;
//! use riskbook_engine::scenarios::{Scenario, ShiftMode};
//! use riskbook_models::instruments::Stock;
//!
//! let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
//! env.add_constant("MarketPrice-RY", 80.0);
//!
//! let mut portfolio = Portfolio::new("book", Currency::CAD);
//! portfolio.add_product(Stock::new("RY", Currency::CAD), 100.0);
//!
//! let base = portfolio.value(&env).unwrap();
//! let crash = Scenario::new("crash").with_shift("Constants-MarketPrice-RY".parse().unwrap(), -0.1);
//! let shocked = crash.apply(&env, ShiftMode::Relative).unwrap();
//! let pnl = portfolio.value(&shocked).unwrap() - base;
//! assert!((pnl + 800.0).abs() < 1e-9);
//!
//! let var = var_from_pnl(&[pnl, 0.0, 100.0], 0.01).unwrap();
//! assert!(var.var <= 0.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod config;
pub mod loader;
pub mod parallel;
pub mod portfolio;
pub mod risk;
pub mod scenarios;
pub mod simulation;
