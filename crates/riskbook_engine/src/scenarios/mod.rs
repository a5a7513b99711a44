//! Scenario engine.
//!
//! A [`Scenario`] is a named list of `(RiskFactorKey, delta)` moves applied
//! to a [`MarketEnvironment`](riskbook_core::market::MarketEnvironment) in
//! absolute or relative [`ShiftMode`]. Application never mutates the input:
//! it returns a copy that shares every entry it does not move, so thousands
//! of shocked environments can coexist over one base.
//!
//! Built on top of that:
//! - [`ScenarioTable`]: rows of deltas over a fixed factor list, from the
//!   simulation engine or history
//! - [`shift_market_data`] and its per-category wrappers: uniform moves of
//!   every simulated factor under a key prefix
//! - [`PresetScenario`]: the adverse and financial-vulnerability stresses
//! - [`HistoricalScenarios`]: dated rows with window selection
//! - [`sensitivities`] and [`dv01_convexity`]: bump-and-revalue risk

mod error;
mod historical;
mod presets;
mod sensitivities;
mod shifts;
mod table;

pub use error::ScenarioError;
pub use historical::{CrisisWindow, HistoricalScenarios};
pub use presets::{PresetScenario, PresetStep};
pub use sensitivities::{bump_size, dv01_convexity, sensitivities, RateSensitivity, Sensitivity, BASIS_POINT};
pub use shifts::{
    matching_factors, shift_constant, shift_curve, shift_list, shift_market_data, shift_matrix,
    shift_surface, Scenario, ShiftMode,
};
pub use table::ScenarioTable;
