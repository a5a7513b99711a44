//! Payment frequency enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ScheduleError;

/// Payment frequency for coupon bonds and CDS premium legs.
///
/// Instrument records carry the frequency as a payment count per year, so
/// the type (de)serialises as that integer.
///
/// # Examples
///
/// ```
/// use riskbook_models::schedules::Frequency;
///
/// let freq = Frequency::try_from(4).unwrap();
/// assert_eq!(freq, Frequency::Quarterly);
/// assert_eq!(freq.months_between_payments(), 3);
/// assert!(Frequency::try_from(5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Frequency {
    /// Annual payments (once per year).
    Annual,
    /// Semi-annual payments (twice per year).
    #[default]
    SemiAnnual,
    /// Quarterly payments (four times per year).
    Quarterly,
    /// Monthly payments (twelve times per year).
    Monthly,
}

impl Frequency {
    /// Returns the number of payment periods per year.
    #[inline]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
        }
    }

    /// Payment count per year as a float, for compounding.
    #[inline]
    pub fn per_year(&self) -> f64 {
        self.periods_per_year() as f64
    }

    /// Length of one period in years.
    #[inline]
    pub fn period_length(&self) -> f64 {
        1.0 / self.per_year()
    }

    /// Returns the number of months between payment dates.
    #[inline]
    pub fn months_between_payments(&self) -> u32 {
        12 / self.periods_per_year()
    }

    /// Returns a human-readable name for the frequency.
    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Annual => "Annual",
            Frequency::SemiAnnual => "Semi-Annual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Monthly => "Monthly",
        }
    }
}

impl TryFrom<u32> for Frequency {
    type Error = ScheduleError;

    fn try_from(per_year: u32) -> Result<Self, Self::Error> {
        match per_year {
            1 => Ok(Frequency::Annual),
            2 => Ok(Frequency::SemiAnnual),
            4 => Ok(Frequency::Quarterly),
            12 => Ok(Frequency::Monthly),
            other => Err(ScheduleError::InvalidFrequency(other)),
        }
    }
}

impl From<Frequency> for u32 {
    fn from(freq: Frequency) -> Self {
        freq.periods_per_year()
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Frequency {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "annual" | "annually" | "1y" | "12m" | "1" => Ok(Frequency::Annual),
            "semi-annual" | "semiannual" | "semi_annual" | "6m" | "2" => Ok(Frequency::SemiAnnual),
            "quarterly" | "3m" | "4" => Ok(Frequency::Quarterly),
            "monthly" | "1m" | "12" => Ok(Frequency::Monthly),
            _ => Err(ScheduleError::UnknownFrequency(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_months_between_payments() {
        assert_eq!(Frequency::Annual.months_between_payments(), 12);
        assert_eq!(Frequency::SemiAnnual.months_between_payments(), 6);
        assert_eq!(Frequency::Quarterly.months_between_payments(), 3);
        assert_eq!(Frequency::Monthly.months_between_payments(), 1);
    }

    #[test]
    fn test_from_str_variants() {
        assert_eq!("Semi-Annual".parse::<Frequency>().unwrap(), Frequency::SemiAnnual);
        assert_eq!("3M".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert!("weekly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_integer_serde() {
        let f: Frequency = serde_json::from_str("12").unwrap();
        assert_eq!(f, Frequency::Monthly);
        assert_eq!(serde_json::to_string(&Frequency::Quarterly).unwrap(), "4");
        assert!(serde_json::from_str::<Frequency>("3").is_err());
    }

    #[test]
    fn test_period_length() {
        assert_eq!(Frequency::Quarterly.period_length(), 0.25);
        assert_eq!(Frequency::SemiAnnual.per_year(), 2.0);
    }
}
