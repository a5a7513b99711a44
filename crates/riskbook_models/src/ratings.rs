//! Letter-grade credit ratings.
//!
//! Ratings are kept per agency. Market data tables are keyed by S&P grades,
//! which may carry a notch (`BBB+`, `BBB-`); when a table has no row for a
//! grade the lookup retries without the notch and finally falls back to the
//! worst grade the table carries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Agency whose grades key the market data tables.
pub const SP: &str = "S&P";

/// Highest grade; bonds rated `AAA` carry no credit spread.
pub const TOP_GRADE: &str = "AAA";

/// Defaulted grade, the last column of a transition matrix.
pub const DEFAULT_GRADE: &str = "D";

/// S&P grades from best to worst.
pub const SP_SCALE: [&str; 22] = [
    "AAA", "AA+", "AA", "AA-", "A+", "A", "A-", "BBB+", "BBB", "BBB-", "BB+", "BB", "BB-", "B+",
    "B", "B-", "CCC+", "CCC", "CCC-", "CC", "C", "D",
];

const DISTRESSED: [&str; 4] = ["NR", "CCC", "CC", "C"];

/// Ratings by agency name.
///
/// # Examples
///
/// ```
/// use riskbook_models::ratings::{Ratings, SP};
///
/// let mut ratings = Ratings::single(SP, "BBB+");
/// assert_eq!(ratings.get(SP), Some("BBB+"));
///
/// ratings.set(SP, "BB");
/// assert_eq!(ratings.sp(), Some("BB"));
/// assert_eq!(ratings.get("Moody's"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratings(BTreeMap<String, String>);

impl Ratings {
    /// Ratings with a single agency grade.
    pub fn single(agency: impl Into<String>, grade: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(agency.into(), grade.into());
        Self(map)
    }

    /// Grade assigned by `agency`.
    pub fn get(&self, agency: &str) -> Option<&str> {
        self.0.get(agency).map(String::as_str)
    }

    /// Assigns `grade` for `agency`, replacing any previous grade.
    pub fn set(&mut self, agency: impl Into<String>, grade: impl Into<String>) {
        self.0.insert(agency.into(), grade.into());
    }

    /// S&P grade.
    pub fn sp(&self) -> Option<&str> {
        self.get(SP)
    }

    /// Iterates over `(agency, grade)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(a, g)| (a.as_str(), g.as_str()))
    }
}

/// Grade with any `+`/`-` notch removed.
///
/// ```
/// use riskbook_models::ratings::strip_notch;
///
/// assert_eq!(strip_notch("BBB-"), "BBB");
/// assert_eq!(strip_notch("AA+"), "AA");
/// assert_eq!(strip_notch("A"), "A");
/// ```
pub fn strip_notch(grade: &str) -> &str {
    grade.trim().trim_end_matches(&['+', '-'][..])
}

/// Position on [`SP_SCALE`], 0 being the best grade.
///
/// Combined buckets such as `CCC/C` rank as their first grade.
pub fn rank(grade: &str) -> Option<usize> {
    let head = grade.split('/').next().unwrap_or(grade).trim();
    SP_SCALE.iter().position(|g| *g == head)
}

/// How a rating was matched to a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMatch {
    /// The grade itself labels a row.
    Exact,
    /// The grade without its notch labels a row.
    NotchStripped,
    /// A distressed or unrated grade mapped to the combined bucket row.
    DistressedBucket,
    /// No match; the worst-graded row was used.
    WorstCase,
}

/// Finds the row to use for `grade` among `labels`.
///
/// Tries, in order: the exact grade, the grade without its notch, then (when
/// `distressed_bucket` is given and the grade is `NR`, `CCC`, `CC` or `C`)
/// the bucket row, and finally the worst-graded row present. Rows whose
/// label is not on the scale only win the worst-case fallback when no label
/// is on the scale, in which case the last row is used.
///
/// Returns `None` only for an empty table.
///
/// # Examples
///
/// ```
/// use riskbook_models::ratings::{resolve_row, RowMatch};
///
/// let rows: Vec<String> = ["AA", "A", "BBB", "CCC/C"].iter().map(|s| s.to_string()).collect();
///
/// assert_eq!(resolve_row(&rows, "BBB", None), Some((2, RowMatch::Exact)));
/// assert_eq!(resolve_row(&rows, "A-", None), Some((1, RowMatch::NotchStripped)));
/// assert_eq!(resolve_row(&rows, "NR", Some("CCC/C")), Some((3, RowMatch::DistressedBucket)));
/// assert_eq!(resolve_row(&rows, "BB", None), Some((3, RowMatch::WorstCase)));
/// ```
pub fn resolve_row(
    labels: &[String],
    grade: &str,
    distressed_bucket: Option<&str>,
) -> Option<(usize, RowMatch)> {
    let grade = grade.trim();
    if let Some(i) = labels.iter().position(|l| l == grade) {
        return Some((i, RowMatch::Exact));
    }
    let stripped = strip_notch(grade);
    if let Some(i) = labels.iter().position(|l| l == stripped) {
        return Some((i, RowMatch::NotchStripped));
    }
    if let Some(bucket) = distressed_bucket {
        if DISTRESSED.contains(&stripped) {
            if let Some(i) = labels.iter().position(|l| l == bucket) {
                return Some((i, RowMatch::DistressedBucket));
            }
        }
    }
    worst_row(labels).map(|i| (i, RowMatch::WorstCase))
}

/// Index of the worst-graded label, or the last label when none is on the
/// scale.
pub fn worst_row(labels: &[String]) -> Option<usize> {
    labels
        .iter()
        .enumerate()
        .filter_map(|(i, l)| rank(l).map(|r| (r, i)))
        .max()
        .map(|(_, i)| i)
        .or_else(|| labels.len().checked_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_rank_order() {
        assert_eq!(rank("AAA"), Some(0));
        assert!(rank("BBB-").unwrap() > rank("BBB+").unwrap());
        assert_eq!(rank("CCC/C"), rank("CCC"));
        assert_eq!(rank("NR"), None);
    }

    #[test]
    fn test_worst_row_ignores_unknown_labels() {
        assert_eq!(worst_row(&labels(&["A", "Other", "BB", "AA"])), Some(2));
        assert_eq!(worst_row(&labels(&["x", "y"])), Some(1));
        assert_eq!(worst_row(&[]), None);
    }

    #[test]
    fn test_distressed_bucket_requires_alias() {
        let rows = labels(&["A", "BBB", "CCC/C"]);
        assert_eq!(resolve_row(&rows, "CC", None), Some((2, RowMatch::WorstCase)));
        assert_eq!(
            resolve_row(&rows, "CCC+", Some("CCC/C")),
            Some((2, RowMatch::DistressedBucket))
        );
    }

    #[test]
    fn test_notched_row_preferred_over_stripped() {
        let rows = labels(&["BBB", "BBB-"]);
        assert_eq!(resolve_row(&rows, "BBB-", None), Some((1, RowMatch::Exact)));
    }

    #[test]
    fn test_ratings_serde_is_a_map() {
        let r: Ratings = serde_json::from_str(r#"{"S&P": "A-", "Moody's": "A3"}"#).unwrap();
        assert_eq!(r.sp(), Some("A-"));
        assert_eq!(r.iter().count(), 2);
    }
}
