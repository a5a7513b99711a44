//! Market inputs shared by several instruments.
//!
//! Key construction lives here so that pricing and risk factor declarations
//! agree on the names they use.

use riskbook_core::market::{Curve, MarketDataError, MarketEnvironment, Table};
use riskbook_core::math::interpolators::{onto_key_rates, KEY_RATE_TENORS};
use riskbook_core::types::Currency;

use super::error::InstrumentError;
use crate::ratings::{resolve_row, RowMatch, TOP_GRADE};

/// Default risk-free curve family.
pub const DEFAULT_RISK_FREE: &str = "Gov";

/// List of recovery rates by seniority tier.
pub const RECOVERY_RATES: &str = "RecoveryRates";

/// Matrix of hazard rates by rating.
pub const HAZARD_RATES: &str = "HazardRates-Ratings";

/// List of one-period default probabilities by rating.
pub const DEFAULT_PROBABILITY: &str = "DefaultProbability";

/// Rating transition matrix.
pub const TRANSITION_MATRIX: &str = "CreditTransitionMatrix";

/// `RiskFree-{family}-{ccy}`.
pub fn risk_free_key(family: &str, currency: Currency) -> String {
    format!("RiskFree-{}-{}", family, currency)
}

/// `CreditSpreads-Ratings-{ccy}`.
pub fn credit_spreads_key(currency: Currency) -> String {
    format!("CreditSpreads-Ratings-{}", currency)
}

/// `IdiosyncraticSpread-{id}`.
pub fn idiosyncratic_spread_key(id: &str) -> String {
    format!("IdiosyncraticSpread-{}", id)
}

/// `MarketPrice-{id}`.
pub fn market_price_key(id: &str) -> String {
    format!("MarketPrice-{}", id)
}

/// Risk-free + rating spread + idiosyncratic spread, on the key-rate tenors.
///
/// A rating of `AAA` carries no spread. Other ratings pick their row of
/// `CreditSpreads-Ratings-{ccy}`; a missing or unrated grade falls back to
/// the most conservative row, with a warning.
///
/// # Examples
/// ```
/// use riskbook_core::market::{Curve, MarketEnvironment, Table};
/// use riskbook_core::types::{Currency, Date};
/// use riskbook_models::instruments::inputs::credit_discount_curve;
///
/// let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
/// env.add_curve("RiskFree-Gov-CAD", Curve::flat(0.01));
/// env.add_constant("IdiosyncraticSpread-B1", 0.002);
/// env.add_matrix(
///     "CreditSpreads-Ratings-CAD",
///     Table::new(
///         vec!["A".into(), "BBB".into()],
///         vec!["1".into(), "10".into()],
///         vec![vec![0.005, 0.007], vec![0.010, 0.014]],
///     )
///     .unwrap(),
/// );
///
/// let curve = credit_discount_curve(&env, Currency::CAD, "Gov", Some("BBB"), "B1").unwrap();
/// assert!((curve.value_at(1.0) - 0.022).abs() < 1e-12);
///
/// let top = credit_discount_curve(&env, Currency::CAD, "Gov", Some("AAA"), "B1").unwrap();
/// assert!((top.value_at(5.0) - 0.012).abs() < 1e-12);
/// ```
pub fn credit_discount_curve(
    env: &MarketEnvironment,
    currency: Currency,
    risk_free: &str,
    rating: Option<&str>,
    id: &str,
) -> Result<Curve, InstrumentError> {
    let rf = env.get_curve(&risk_free_key(risk_free, currency))?.on_key_rates();
    let spread = credit_spread_curve(env, currency, rating)?;
    let idio = env.get_constant(&idiosyncratic_spread_key(id))?;

    let values = rf.iter().zip(&spread).map(|(r, s)| r + s + idio).collect();
    Ok(Curve::new(KEY_RATE_TENORS.to_vec(), values)?)
}

fn credit_spread_curve(
    env: &MarketEnvironment,
    currency: Currency,
    rating: Option<&str>,
) -> Result<[f64; 13], InstrumentError> {
    if rating.map(str::trim) == Some(TOP_GRADE) {
        return Ok([0.0; 13]);
    }
    let key = credit_spreads_key(currency);
    let matrix = env.get_matrix(&key)?;
    let tenors = matrix.numeric_columns()?;
    let row = rating_row(matrix, &key, rating.unwrap_or("NR"), None)?;
    Ok(onto_key_rates(&tenors, matrix.row_at(row)))
}

/// Row of a rating-keyed table, falling back to the worst row with a
/// warning when the grade is absent.
pub fn rating_row(
    table: &Table,
    table_key: &str,
    grade: &str,
    distressed_bucket: Option<&str>,
) -> Result<usize, MarketDataError> {
    let (row, how) = resolve_row(table.row_labels(), grade, distressed_bucket)
        .ok_or_else(|| MarketDataError::InvalidTable(format!("'{}' has no rows", table_key)))?;
    if how == RowMatch::WorstCase {
        tracing::warn!(
            table = table_key,
            rating = grade,
            fallback = %table.row_labels()[row],
            "rating not found, using worst available row"
        );
    }
    Ok(row)
}

/// Recovery rate for a seniority tier: the tier's column of
/// `RecoveryRates`, or the last column when the tier is unknown.
pub fn recovery_rate(env: &MarketEnvironment, tier: Option<&str>) -> Result<f64, InstrumentError> {
    let list = env.get_list(RECOVERY_RATES)?;
    let column = tier
        .and_then(|t| list.column_index(t))
        .or_else(|| list.n_cols().checked_sub(1));
    match column {
        Some(j) if list.n_rows() > 0 => Ok(list.at(0, j)),
        _ => Err(MarketDataError::InvalidTable(format!("'{}' is empty", RECOVERY_RATES)).into()),
    }
}

/// Hazard rate for a grade: first column of `HazardRates-Ratings`.
pub fn rating_hazard_rate(env: &MarketEnvironment, grade: Option<&str>) -> Result<f64, InstrumentError> {
    let matrix = env.get_matrix(HAZARD_RATES)?;
    if matrix.n_cols() == 0 {
        return Err(MarketDataError::InvalidTable(format!("'{}' has no columns", HAZARD_RATES)).into());
    }
    let row = rating_row(matrix, HAZARD_RATES, grade.unwrap_or("NR"), None)?;
    Ok(matrix.at(row, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_core::market::RiskCategory;
    use riskbook_core::types::Date;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    fn env() -> MarketEnvironment {
        let mut env = MarketEnvironment::new("t", Date::from_ymd(2017, 6, 1).unwrap());
        env.add_curve("RiskFree-Gov-USD", Curve::flat(0.02));
        env.add_constant("IdiosyncraticSpread-X", 0.0);
        env.add_matrix(
            "CreditSpreads-Ratings-USD",
            Table::new(
                labels(&["A", "BBB", "BB"]),
                labels(&["1", "5"]),
                vec![vec![0.004, 0.006], vec![0.01, 0.012], vec![0.03, 0.035]],
            )
            .unwrap(),
        );
        env.add_list(
            RECOVERY_RATES,
            Table::list(labels(&["Senior", "Subordinated"]), vec![0.45, 0.25]).unwrap(),
        );
        env.add_matrix(
            HAZARD_RATES,
            Table::new(labels(&["A", "BBB"]), labels(&["Hazard"]), vec![vec![0.002], vec![0.008]])
                .unwrap(),
        );
        env
    }

    #[test]
    fn test_notched_rating_uses_plain_row() {
        let curve = credit_discount_curve(&env(), Currency::USD, "Gov", Some("BBB+"), "X").unwrap();
        assert_relative_eq!(curve.value_at(5.0), 0.032);
    }

    #[test]
    fn test_unknown_rating_uses_worst_row() {
        let curve = credit_discount_curve(&env(), Currency::USD, "Gov", Some("B-"), "X").unwrap();
        assert_relative_eq!(curve.value_at(1.0), 0.05);
        let unrated = credit_discount_curve(&env(), Currency::USD, "Gov", None, "X").unwrap();
        assert_relative_eq!(unrated.value_at(1.0), 0.05);
    }

    #[test]
    fn test_missing_idiosyncratic_spread_is_fatal() {
        let err = credit_discount_curve(&env(), Currency::USD, "Gov", Some("A"), "Y").unwrap_err();
        assert_eq!(
            err,
            InstrumentError::MarketData(MarketDataError::MissingRiskFactor {
                category: RiskCategory::Constant,
                key: "IdiosyncraticSpread-Y".to_string(),
            })
        );
    }

    #[test]
    fn test_recovery_by_tier() {
        let env = env();
        assert_eq!(recovery_rate(&env, Some("Senior")).unwrap(), 0.45);
        assert_eq!(recovery_rate(&env, Some("Junior")).unwrap(), 0.25);
        assert_eq!(recovery_rate(&env, None).unwrap(), 0.25);
    }

    #[test]
    fn test_hazard_by_rating() {
        let env = env();
        assert_eq!(rating_hazard_rate(&env, Some("A")).unwrap(), 0.002);
        assert_eq!(rating_hazard_rate(&env, Some("CCC")).unwrap(), 0.008);
    }
}
