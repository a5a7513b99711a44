//! Rows of scenario deltas over a fixed set of factors.

use riskbook_core::market::{MarketEnvironment, RiskFactorKey};

use super::error::ScenarioError;
use super::shifts::{Scenario, ShiftMode};
use crate::parallel::ParallelConfig;

/// One column per factor, one row per scenario.
///
/// Produced by the simulation engine and by historical selection; each row
/// becomes a [`Scenario`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioTable {
    keys: Vec<RiskFactorKey>,
    rows: Vec<Vec<f64>>,
    labels: Vec<String>,
}

impl ScenarioTable {
    /// Table with rows labelled `scenario-{i}`.
    pub fn new(keys: Vec<RiskFactorKey>, rows: Vec<Vec<f64>>) -> Result<Self, ScenarioError> {
        for (row, values) in rows.iter().enumerate() {
            if values.len() != keys.len() {
                return Err(ScenarioError::RowLength {
                    row,
                    expected: keys.len(),
                    got: values.len(),
                });
            }
        }
        let labels = (0..rows.len()).map(|i| format!("scenario-{}", i)).collect();
        Ok(Self { keys, rows, labels })
    }

    /// Replaces the row labels.
    pub fn with_labels(mut self, labels: Vec<String>) -> Result<Self, ScenarioError> {
        if labels.len() != self.rows.len() {
            return Err(ScenarioError::LabelCount {
                expected: self.rows.len(),
                got: labels.len(),
            });
        }
        self.labels = labels;
        Ok(self)
    }

    /// Factor columns.
    pub fn keys(&self) -> &[RiskFactorKey] {
        &self.keys
    }

    /// Row labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of scenarios.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no scenarios.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Deltas of scenario `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.rows[i]
    }

    /// Every row.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Scenario `i` as a named list of moves.
    pub fn scenario(&self, i: usize) -> Scenario {
        Scenario::from_pairs(self.labels[i].clone(), &self.keys, &self.rows[i])
    }

    /// All scenarios in row order.
    pub fn scenarios(&self) -> impl Iterator<Item = Scenario> + '_ {
        (0..self.len()).map(|i| self.scenario(i))
    }

    /// Subset of rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            keys: self.keys.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }

    /// Every delta multiplied by `factor`, as for horizon scaling.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            keys: self.keys.clone(),
            rows: self
                .rows
                .iter()
                .map(|r| r.iter().map(|d| d * factor).collect())
                .collect(),
            labels: self.labels.clone(),
        }
    }

    /// One shocked environment per row.
    ///
    /// Rows are applied independently to `base`, in parallel when there are
    /// enough of them; the output keeps row order.
    pub fn environments(
        &self,
        base: &MarketEnvironment,
        mode: ShiftMode,
        parallel: &ParallelConfig,
    ) -> Result<Vec<MarketEnvironment>, ScenarioError> {
        tracing::info!(scenarios = self.len(), factors = self.keys.len(), %mode, "building scenario environments");
        parallel.try_map_indices(self.len(), |i| self.scenario(i).apply(base, mode))
    }
}
