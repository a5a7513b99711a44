//! Labelled two-dimensional tables.
//!
//! Lists, matrices and surfaces share this representation. A list is a table
//! with a single row.

use serde::{Deserialize, Serialize};

use super::error::MarketDataError;

/// Row-major table of values with string row and column labels.
///
/// # Examples
///
/// ```
/// use riskbook_core::market::Table;
///
/// let spreads = Table::new(
///     vec!["A".into(), "BBB".into()],
///     vec!["1".into(), "5".into()],
///     vec![vec![0.004, 0.007], vec![0.012, 0.018]],
/// )
/// .unwrap();
///
/// assert_eq!(spreads.get("BBB", "5"), Some(0.018));
/// assert_eq!(spreads.numeric_columns().unwrap(), vec![1.0, 5.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr", into = "TableRepr")]
pub struct Table {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Vec<f64>,
}

/// Serialised form: labels plus nested rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRepr {
    #[serde(default)]
    rows: Vec<String>,
    columns: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl Table {
    /// Builds a table from labels and one vector of values per row.
    pub fn new(
        rows: Vec<String>,
        columns: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self, MarketDataError> {
        if values.len() != rows.len() {
            return Err(MarketDataError::InvalidTable(format!(
                "{} row labels for {} rows",
                rows.len(),
                values.len()
            )));
        }
        if let Some(bad) = values.iter().position(|r| r.len() != columns.len()) {
            return Err(MarketDataError::InvalidTable(format!(
                "row '{}' has {} values, expected {}",
                rows[bad],
                values[bad].len(),
                columns.len()
            )));
        }
        Ok(Self {
            rows,
            columns,
            values: values.into_iter().flatten().collect(),
        })
    }

    /// Builds a single-row list.
    pub fn list(columns: Vec<String>, values: Vec<f64>) -> Result<Self, MarketDataError> {
        Self::new(vec!["0".to_string()], columns, vec![values])
    }

    /// Row labels.
    pub fn row_labels(&self) -> &[String] {
        &self.rows
    }

    /// Column labels.
    pub fn column_labels(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Position of a row label.
    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r == label)
    }

    /// Position of a column label.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Value at row and column labels.
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let i = self.row_index(row)?;
        let j = self.column_index(column)?;
        Some(self.at(i, j))
    }

    /// Value at row and column positions.
    ///
    /// # Panics
    ///
    /// Panics when either index is out of range.
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.columns.len() + j]
    }

    /// Value of a list column (first row).
    pub fn list_value(&self, column: &str) -> Option<f64> {
        let j = self.column_index(column)?;
        (!self.rows.is_empty()).then(|| self.at(0, j))
    }

    /// Values of one row, by label.
    pub fn row(&self, label: &str) -> Option<&[f64]> {
        self.row_index(label).map(|i| self.row_at(i))
    }

    /// Values of one row, by position.
    pub fn row_at(&self, i: usize) -> &[f64] {
        let n = self.columns.len();
        &self.values[i * n..(i + 1) * n]
    }

    /// Overwrites the value at row and column labels.
    ///
    /// Returns `false` without writing when either label is absent.
    pub fn set(&mut self, row: &str, column: &str, value: f64) -> bool {
        match (self.row_index(row), self.column_index(column)) {
            (Some(i), Some(j)) => {
                let n = self.columns.len();
                self.values[i * n + j] = value;
                true
            }
            _ => false,
        }
    }

    /// Overwrites a list column (first row).
    pub fn set_list_value(&mut self, column: &str, value: f64) -> bool {
        match (self.rows.first().cloned(), self.column_index(column)) {
            (Some(row), Some(_)) => self.set(&row, column, value),
            _ => false,
        }
    }

    /// Row labels parsed as numbers (maturities of a surface).
    pub fn numeric_rows(&self) -> Result<Vec<f64>, MarketDataError> {
        parse_labels(&self.rows)
    }

    /// Column labels parsed as numbers (tenors or moneyness).
    pub fn numeric_columns(&self) -> Result<Vec<f64>, MarketDataError> {
        parse_labels(&self.columns)
    }

    /// Iterates over `(row, column, value)` cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(i, r)| {
            self.columns
                .iter()
                .enumerate()
                .map(move |(j, c)| (r.as_str(), c.as_str(), self.at(i, j)))
        })
    }
}

fn parse_labels(labels: &[String]) -> Result<Vec<f64>, MarketDataError> {
    labels
        .iter()
        .map(|l| {
            l.trim()
                .parse::<f64>()
                .map_err(|_| MarketDataError::InvalidTable(format!("label '{}' is not numeric", l)))
        })
        .collect()
}

impl TryFrom<TableRepr> for Table {
    type Error = MarketDataError;

    fn try_from(repr: TableRepr) -> Result<Self, Self::Error> {
        let rows = if repr.rows.is_empty() {
            (0..repr.values.len()).map(|i| i.to_string()).collect()
        } else {
            repr.rows
        };
        Table::new(rows, repr.columns, repr.values)
    }
}

impl From<Table> for TableRepr {
    fn from(table: Table) -> Self {
        let n = table.columns.len().max(1);
        let values = table.values.chunks(n).map(<[f64]>::to_vec).collect();
        TableRepr {
            rows: table.rows,
            columns: table.columns,
            values,
        }
    }
}
