//! Cash balances.

use riskbook_core::market::MarketEnvironment;
use riskbook_core::types::Currency;
use serde::{Deserialize, Serialize};

use super::error::PricingError;
use super::traits::{AssetClass, Priceable, RiskFactorSet};

/// One unit of cash in a currency. Worth 1 and carries no exposure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashAccount {
    /// Account identifier
    pub id: String,
    /// Currency of the balance
    pub currency: Currency,
}

impl CashAccount {
    /// Cash account in `currency`.
    pub fn new(id: impl Into<String>, currency: Currency) -> Self {
        Self {
            id: id.into(),
            currency,
        }
    }
}

impl Priceable for CashAccount {
    fn id(&self) -> &str {
        &self.id
    }

    fn currency(&self) -> Currency {
        self.currency
    }

    fn asset_class(&self) -> AssetClass {
        AssetClass::Cash
    }

    fn value(&self, _env: &MarketEnvironment) -> Result<f64, PricingError> {
        Ok(1.0)
    }

    fn exposure(&self, _env: &MarketEnvironment) -> Result<f64, PricingError> {
        Ok(0.0)
    }

    fn market_risk_factors(&self) -> RiskFactorSet {
        RiskFactorSet::new()
    }
}
