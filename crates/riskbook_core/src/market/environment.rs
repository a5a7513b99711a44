//! Copy-on-write store of market data.

use std::collections::HashMap;
use std::sync::Arc;

use super::curve::Curve;
use super::error::MarketDataError;
use super::key::{format_tenor, RiskCategory, RiskFactorKey};
use super::table::Table;
use crate::types::{Currency, Date};

/// Market data for one valuation date.
///
/// Five maps hold constants, lists, curves, matrices and surfaces. Each map
/// and each table sits behind an `Arc`, so cloning an environment is cheap
/// and a modified clone copies only the entry it changes. Scenario
/// environments produced from a shared base therefore never disturb it.
///
/// # Examples
///
/// ```
/// use riskbook_core::market::{MarketEnvironment, RiskFactorKey};
/// use riskbook_core::types::Date;
///
/// let mut base = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
/// base.add_constant("FXRates-USDCAD", 1.35);
///
/// let key = RiskFactorKey::constant("FXRates-USDCAD");
/// let shocked = base.with_value(&key, 1.40).unwrap();
///
/// assert_eq!(base.get_value(&key).unwrap(), 1.35);
/// assert_eq!(shocked.get_value(&key).unwrap(), 1.40);
/// ```
#[derive(Debug, Clone)]
pub struct MarketEnvironment {
    id: String,
    valuation_date: Date,
    constants: Arc<HashMap<String, f64>>,
    lists: Arc<HashMap<String, Arc<Table>>>,
    curves: Arc<HashMap<String, Arc<Curve>>>,
    matrices: Arc<HashMap<String, Arc<Table>>>,
    surfaces: Arc<HashMap<String, Arc<Table>>>,
}

impl MarketEnvironment {
    /// Empty environment.
    pub fn new(id: impl Into<String>, valuation_date: Date) -> Self {
        Self {
            id: id.into(),
            valuation_date,
            constants: Arc::default(),
            lists: Arc::default(),
            curves: Arc::default(),
            matrices: Arc::default(),
            surfaces: Arc::default(),
        }
    }

    /// Identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Valuation date.
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Changes the valuation date in place.
    pub fn set_valuation_date(&mut self, date: Date) {
        self.valuation_date = date;
    }

    /// Copy sharing all data, with a different valuation date.
    pub fn with_valuation_date(&self, date: Date) -> Self {
        let mut env = self.clone();
        env.valuation_date = date;
        env
    }

    /// Copy sharing all data, with a different identifier.
    pub fn with_id(&self, id: impl Into<String>) -> Self {
        let mut env = self.clone();
        env.id = id.into();
        env
    }

    /// Replaces the five data maps with shared references to `other`'s.
    ///
    /// The identifier and valuation date of `self` are kept.
    pub fn initialize_from_env(&mut self, other: &MarketEnvironment) {
        self.constants = Arc::clone(&other.constants);
        self.lists = Arc::clone(&other.lists);
        self.curves = Arc::clone(&other.curves);
        self.matrices = Arc::clone(&other.matrices);
        self.surfaces = Arc::clone(&other.surfaces);
    }

    /// Adds or replaces a constant.
    pub fn add_constant(&mut self, key: impl Into<String>, value: f64) {
        Arc::make_mut(&mut self.constants).insert(key.into(), value);
    }

    /// Adds or replaces a list.
    pub fn add_list(&mut self, key: impl Into<String>, list: Table) {
        Arc::make_mut(&mut self.lists).insert(key.into(), Arc::new(list));
    }

    /// Adds or replaces a curve.
    pub fn add_curve(&mut self, key: impl Into<String>, curve: Curve) {
        Arc::make_mut(&mut self.curves).insert(key.into(), Arc::new(curve));
    }

    /// Adds or replaces a matrix.
    pub fn add_matrix(&mut self, key: impl Into<String>, matrix: Table) {
        Arc::make_mut(&mut self.matrices).insert(key.into(), Arc::new(matrix));
    }

    /// Adds or replaces a surface.
    pub fn add_surface(&mut self, key: impl Into<String>, surface: Table) {
        Arc::make_mut(&mut self.surfaces).insert(key.into(), Arc::new(surface));
    }

    /// Constant by key.
    pub fn get_constant(&self, key: &str) -> Result<f64, MarketDataError> {
        self.constants
            .get(key)
            .copied()
            .ok_or_else(|| MarketDataError::missing(RiskCategory::Constant, key))
    }

    /// List by key.
    pub fn get_list(&self, key: &str) -> Result<&Table, MarketDataError> {
        self.lists
            .get(key)
            .map(Arc::as_ref)
            .ok_or_else(|| MarketDataError::missing(RiskCategory::List, key))
    }

    /// Curve by key.
    pub fn get_curve(&self, key: &str) -> Result<&Curve, MarketDataError> {
        self.curves
            .get(key)
            .map(Arc::as_ref)
            .ok_or_else(|| MarketDataError::missing(RiskCategory::Curve, key))
    }

    /// Matrix by key.
    pub fn get_matrix(&self, key: &str) -> Result<&Table, MarketDataError> {
        self.matrices
            .get(key)
            .map(Arc::as_ref)
            .ok_or_else(|| MarketDataError::missing(RiskCategory::Matrix, key))
    }

    /// Surface by key.
    pub fn get_surface(&self, key: &str) -> Result<&Table, MarketDataError> {
        self.surfaces
            .get(key)
            .map(Arc::as_ref)
            .ok_or_else(|| MarketDataError::missing(RiskCategory::Surface, key))
    }

    /// Single list entry.
    pub fn get_list_value(&self, key: &str, column: &str) -> Result<f64, MarketDataError> {
        self.get_list(key)?
            .list_value(column)
            .ok_or_else(|| MarketDataError::missing(RiskCategory::List, format!("{}-{}", key, column)))
    }

    /// Single matrix cell.
    pub fn get_matrix_value(
        &self,
        key: &str,
        row: &str,
        column: &str,
    ) -> Result<f64, MarketDataError> {
        self.get_matrix(key)?.get(row, column).ok_or_else(|| {
            MarketDataError::missing(RiskCategory::Matrix, format!("{}-{}-{}", key, row, column))
        })
    }

    /// Conversion rate from `from` to `to`.
    ///
    /// `1` for equal currencies, otherwise the constant `FXRates-{from}{to}`,
    /// otherwise the reciprocal of `FXRates-{to}{from}`.
    pub fn fx_rate(&self, from: Currency, to: Currency) -> Result<f64, MarketDataError> {
        if from == to {
            return Ok(1.0);
        }
        if let Some(&rate) = self.constants.get(&format!("FXRates-{}{}", from, to)) {
            return Ok(rate);
        }
        match self.constants.get(&format!("FXRates-{}{}", to, from)) {
            Some(&inverse) if inverse != 0.0 => {
                tracing::debug!(%from, %to, "using inverted FX quote");
                Ok(1.0 / inverse)
            }
            _ => Err(MarketDataError::MissingFxRate { from, to }),
        }
    }

    /// Value addressed by a structured key.
    pub fn get_value(&self, key: &RiskFactorKey) -> Result<f64, MarketDataError> {
        let missing = || MarketDataError::missing(key.category(), key.to_string());
        match key {
            RiskFactorKey::Constant { name } => self.get_constant(name),
            RiskFactorKey::List { name, column } => {
                self.get_list(name)?.list_value(column).ok_or_else(missing)
            }
            RiskFactorKey::Curve { name, tenor } => {
                self.get_curve(name)?.pillar_value(tenor).ok_or_else(missing)
            }
            RiskFactorKey::Matrix { name, row, column } => {
                self.get_matrix(name)?.get(row, column).ok_or_else(missing)
            }
            RiskFactorKey::Surface { name, row, column } => {
                self.get_surface(name)?.get(row, column).ok_or_else(missing)
            }
        }
    }

    /// Overwrites the value addressed by `key`.
    ///
    /// Only the touched map and entry are copied when they are shared with
    /// another environment. The key must already exist.
    pub fn set_value(&mut self, key: &RiskFactorKey, value: f64) -> Result<(), MarketDataError> {
        let missing = || MarketDataError::missing(key.category(), key.to_string());
        let written = match key {
            RiskFactorKey::Constant { name } => {
                match Arc::make_mut(&mut self.constants).get_mut(name.as_str()) {
                    Some(slot) => {
                        *slot = value;
                        true
                    }
                    None => false,
                }
            }
            RiskFactorKey::List { name, column } => {
                table_entry(&mut self.lists, name).is_some_and(|t| t.set_list_value(column, value))
            }
            RiskFactorKey::Curve { name, tenor } => {
                match Arc::make_mut(&mut self.curves).get_mut(name.as_str()) {
                    Some(curve) => Arc::make_mut(curve).set_pillar(tenor, value),
                    None => false,
                }
            }
            RiskFactorKey::Matrix { name, row, column } => {
                table_entry(&mut self.matrices, name).is_some_and(|t| t.set(row, column, value))
            }
            RiskFactorKey::Surface { name, row, column } => {
                table_entry(&mut self.surfaces, name).is_some_and(|t| t.set(row, column, value))
            }
        };
        if written {
            Ok(())
        } else {
            Err(missing())
        }
    }

    /// Copy with the value addressed by `key` replaced.
    pub fn with_value(&self, key: &RiskFactorKey, value: f64) -> Result<Self, MarketDataError> {
        let mut env = self.clone();
        env.set_value(key, value)?;
        Ok(env)
    }

    /// Every addressable value, sorted by key.
    pub fn factor_keys(&self) -> Vec<RiskFactorKey> {
        let mut keys: Vec<RiskFactorKey> = self
            .constants
            .keys()
            .map(|k| RiskFactorKey::constant(k.as_str()))
            .collect();
        for (name, list) in self.lists.iter() {
            keys.extend(
                list.column_labels()
                    .iter()
                    .map(|c| RiskFactorKey::list(name.as_str(), c.as_str())),
            );
        }
        for (name, curve) in self.curves.iter() {
            keys.extend(curve.tenors().iter().map(|&t| RiskFactorKey::Curve {
                name: name.clone(),
                tenor: format_tenor(t),
            }));
        }
        for (name, matrix) in self.matrices.iter() {
            keys.extend(
                matrix
                    .cells()
                    .map(|(r, c, _)| RiskFactorKey::matrix(name.as_str(), r, c)),
            );
        }
        for (name, surface) in self.surfaces.iter() {
            keys.extend(
                surface
                    .cells()
                    .map(|(r, c, _)| RiskFactorKey::surface(name.as_str(), r, c)),
            );
        }
        keys.sort();
        keys
    }

    /// Names of the entries held in one category, sorted.
    pub fn names(&self, category: RiskCategory) -> Vec<&str> {
        let mut names: Vec<&str> = match category {
            RiskCategory::Constant => self.constants.keys().map(String::as_str).collect(),
            RiskCategory::List => self.lists.keys().map(String::as_str).collect(),
            RiskCategory::Curve => self.curves.keys().map(String::as_str).collect(),
            RiskCategory::Matrix => self.matrices.keys().map(String::as_str).collect(),
            RiskCategory::Surface => self.surfaces.keys().map(String::as_str).collect(),
        };
        names.sort_unstable();
        names
    }

    /// Whether `self` and `other` hold the same entry objects in every map.
    ///
    /// True for a fresh clone; false once either side has been written to.
    pub fn shares_data_with(&self, other: &MarketEnvironment) -> bool {
        Arc::ptr_eq(&self.constants, &other.constants)
            && Arc::ptr_eq(&self.lists, &other.lists)
            && Arc::ptr_eq(&self.curves, &other.curves)
            && Arc::ptr_eq(&self.matrices, &other.matrices)
            && Arc::ptr_eq(&self.surfaces, &other.surfaces)
    }
}

fn table_entry<'a>(
    map: &'a mut Arc<HashMap<String, Arc<Table>>>,
    name: &str,
) -> Option<&'a mut Table> {
    Arc::make_mut(map).get_mut(name).map(Arc::make_mut)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> MarketEnvironment {
        let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
        env.add_constant("MarketPrice-ABC", 50.0);
        env.add_constant("FXRates-USDCAD", 1.25);
        env.add_list(
            "RecoveryRates",
            Table::list(labels(&["Senior", "Junior"]), vec![0.4, 0.2]).unwrap(),
        );
        env.add_curve(
            "RiskFree-Gov-CAD",
            Curve::new(vec![0.25, 1.0], vec![0.01, 0.02]).unwrap(),
        );
        env.add_matrix(
            "CreditSpreads-Ratings-CAD",
            Table::new(labels(&["BBB-"]), labels(&["1", "5"]), vec![vec![0.01, 0.02]]).unwrap(),
        );
        env.add_surface(
            "ImpliedVols-CAD-ABC",
            Table::new(labels(&["1"]), labels(&["1"]), vec![vec![0.2]]).unwrap(),
        );
        env
    }

    #[test]
    fn test_missing_keys_fail() {
        let env = sample();
        let err = env.get_curve("RiskFree-Gov-USD").unwrap_err();
        assert_eq!(
            err,
            MarketDataError::MissingRiskFactor {
                category: RiskCategory::Curve,
                key: "RiskFree-Gov-USD".to_string()
            }
        );
        assert!(env.get_list_value("RecoveryRates", "Mezz").is_err());
        assert!(env.get_matrix_value("CreditSpreads-Ratings-CAD", "AA", "1").is_err());
    }

    #[test]
    fn test_get_value_every_category() {
        let env = sample();
        let cases = [
            ("Constants-MarketPrice-ABC", 50.0),
            ("Lists-RecoveryRates-Junior", 0.2),
            ("Curves-RiskFree-Gov-CAD-0.25", 0.01),
            ("Matrices-CreditSpreads-Ratings-CAD-BBB--5", 0.02),
            ("Surfaces-ImpliedVols-CAD-ABC-1-1", 0.2),
        ];
        for (key, expected) in cases {
            let key: RiskFactorKey = key.parse().unwrap();
            assert_eq!(env.get_value(&key).unwrap(), expected);
        }
    }

    #[test]
    fn test_with_value_copies_on_write() {
        let base = sample();
        let key = RiskFactorKey::curve("RiskFree-Gov-CAD", 1.0);
        let shocked = base.with_value(&key, 0.03).unwrap();

        assert_eq!(base.get_value(&key).unwrap(), 0.02);
        assert_eq!(shocked.get_value(&key).unwrap(), 0.03);
        // untouched maps stay shared
        assert!(Arc::ptr_eq(&base.matrices, &shocked.matrices));
        assert!(!Arc::ptr_eq(&base.curves, &shocked.curves));
    }

    #[test]
    fn test_set_value_unknown_label() {
        let mut env = sample();
        let key = RiskFactorKey::curve("RiskFree-Gov-CAD", 7.0);
        assert!(env.set_value(&key, 0.1).is_err());
        let key = RiskFactorKey::constant("MarketPrice-XYZ");
        assert!(env.set_value(&key, 0.1).is_err());
    }

    #[test]
    fn test_valuation_date_and_initialize() {
        let base = sample();
        let later = base.with_valuation_date(Date::from_ymd(2018, 1, 1).unwrap());
        assert_eq!(base.valuation_date(), Date::from_ymd(2017, 6, 1).unwrap());
        assert!(later.shares_data_with(&base));

        let mut fresh = MarketEnvironment::new("copy", Date::from_ymd(2020, 1, 1).unwrap());
        fresh.initialize_from_env(&base);
        assert_eq!(fresh.valuation_date(), Date::from_ymd(2020, 1, 1).unwrap());
        assert_eq!(fresh.id(), "copy");
        assert_eq!(fresh.get_constant("MarketPrice-ABC").unwrap(), 50.0);
    }

    #[test]
    fn test_fx_rate_lookup() {
        let env = sample();
        assert_eq!(env.fx_rate(Currency::CAD, Currency::CAD).unwrap(), 1.0);
        assert_eq!(env.fx_rate(Currency::USD, Currency::CAD).unwrap(), 1.25);
        assert_eq!(env.fx_rate(Currency::CAD, Currency::USD).unwrap(), 0.8);
        assert!(matches!(
            env.fx_rate(Currency::EUR, Currency::CAD),
            Err(MarketDataError::MissingFxRate { .. })
        ));
    }

    #[test]
    fn test_factor_keys() {
        let keys = sample().factor_keys();
        assert_eq!(keys.len(), 2 + 2 + 2 + 2 + 1);
        assert!(keys.contains(&RiskFactorKey::matrix("CreditSpreads-Ratings-CAD", "BBB-", "1")));
        assert!(keys.contains(&RiskFactorKey::curve("RiskFree-Gov-CAD", 0.25)));
    }
}
