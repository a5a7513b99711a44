//! Dated historical factor moves.
//!
//! Rows are daily relative changes of the simulated factors, observed on the
//! row's date. Selections return plain [`ScenarioTable`]s labelled by date.

use riskbook_core::market::RiskFactorKey;
use riskbook_core::types::Date;

use super::error::ScenarioError;
use super::table::ScenarioTable;

/// A named window of historical stress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrisisWindow {
    /// 2000-01-01 to 2003-01-01
    DotCom,
    /// 2007-09-01 to 2009-09-01
    Housing,
}

impl CrisisWindow {
    /// Both windows, oldest first.
    pub const ALL: [CrisisWindow; 2] = [CrisisWindow::DotCom, CrisisWindow::Housing];

    /// Start (exclusive) and end (inclusive) of the window.
    pub fn bounds(&self) -> Result<(Date, Date), ScenarioError> {
        let (start, end) = match self {
            CrisisWindow::DotCom => ((2000, 1, 1), (2003, 1, 1)),
            CrisisWindow::Housing => ((2007, 9, 1), (2009, 9, 1)),
        };
        Ok((
            Date::from_ymd(start.0, start.1, start.2)?,
            Date::from_ymd(end.0, end.1, end.2)?,
        ))
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            CrisisWindow::DotCom => "dot-com bubble",
            CrisisWindow::Housing => "housing bubble",
        }
    }
}

/// Historical scenarios sorted by date.
///
/// # Examples
/// ```
/// use riskbook_core::market::RiskFactorKey;
/// use riskbook_core::types::Date;
/// use riskbook_engine::scenarios::HistoricalScenarios;
///
/// let d = |m, day| Date::from_ymd(2017, m, day).unwrap();
/// let history = HistoricalScenarios::new(
///     vec![RiskFactorKey::constant("MarketPrice-RY")],
///     vec![d(1, 3), d(1, 4), d(1, 5)],
///     vec![vec![0.01], vec![-0.02], vec![0.005]],
/// )
/// .unwrap();
///
/// let window = history.between(d(1, 3), d(1, 5));
/// assert_eq!(window.len(), 2);
/// assert_eq!(window.labels()[0], "2017-01-04");
///
/// assert_eq!(history.last_n(d(1, 4), 5).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalScenarios {
    dates: Vec<Date>,
    table: ScenarioTable,
}

impl HistoricalScenarios {
    /// Scenarios from dated rows, in any order.
    pub fn new(keys: Vec<RiskFactorKey>, dates: Vec<Date>, rows: Vec<Vec<f64>>) -> Result<Self, ScenarioError> {
        if dates.len() != rows.len() {
            return Err(ScenarioError::LabelCount {
                expected: rows.len(),
                got: dates.len(),
            });
        }
        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);

        let labels = order.iter().map(|&i| dates[i].to_string()).collect();
        let sorted_rows = order.iter().map(|&i| rows[i].clone()).collect();
        let table = ScenarioTable::new(keys, sorted_rows)?.with_labels(labels)?;
        let dates = order.iter().map(|&i| dates[i]).collect();
        Ok(Self { dates, table })
    }

    /// Observation dates, ascending.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Every row.
    pub fn table(&self) -> &ScenarioTable {
        &self.table
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// True when there are no observations.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Rows dated after `start` and on or before `end`.
    pub fn between(&self, start: Date, end: Date) -> ScenarioTable {
        let picked: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, &d)| d > start && d <= end)
            .map(|(i, _)| i)
            .collect();
        self.table.select(&picked)
    }

    /// The last `n` rows dated on or before `end`, oldest first.
    pub fn last_n(&self, end: Date, n: usize) -> ScenarioTable {
        let upto = self.dates.partition_point(|&d| d <= end);
        let from = upto.saturating_sub(n);
        let picked: Vec<usize> = (from..upto).collect();
        self.table.select(&picked)
    }

    /// Rows inside a named crisis window.
    pub fn crisis(&self, window: CrisisWindow) -> Result<ScenarioTable, ScenarioError> {
        let (start, end) = window.bounds()?;
        let table = self.between(start, end);
        tracing::debug!(window = window.name(), rows = table.len(), "selected crisis scenarios");
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn history() -> HistoricalScenarios {
        HistoricalScenarios::new(
            vec![RiskFactorKey::constant("X")],
            vec![d(2008, 1, 2), d(1999, 12, 31), d(2001, 6, 1), d(2009, 9, 1), d(2000, 1, 1)],
            vec![vec![3.0], vec![0.0], vec![2.0], vec![4.0], vec![1.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_rows_sorted_by_date() {
        let h = history();
        assert_eq!(h.dates()[0], d(1999, 12, 31));
        assert_eq!(h.table().row(4), &[4.0]);
    }

    #[test]
    fn test_crisis_windows_exclude_start_include_end() {
        let h = history();
        let dotcom = h.crisis(CrisisWindow::DotCom).unwrap();
        assert_eq!(dotcom.rows(), &[vec![2.0]]);
        let housing = h.crisis(CrisisWindow::Housing).unwrap();
        assert_eq!(housing.rows(), &[vec![3.0], vec![4.0]]);
    }

    #[test]
    fn test_last_n_before_date() {
        let h = history();
        let last = h.last_n(d(2008, 12, 31), 2);
        assert_eq!(last.rows(), &[vec![2.0], vec![3.0]]);
        assert!(h.last_n(d(1990, 1, 1), 10).is_empty());
    }

    #[test]
    fn test_date_count_checked() {
        let err = HistoricalScenarios::new(vec![RiskFactorKey::constant("X")], vec![], vec![vec![1.0]]).unwrap_err();
        assert_eq!(err, ScenarioError::LabelCount { expected: 1, got: 0 });
    }
}
