//! Directory-backed loader for JSON and CSV files.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use riskbook_core::market::{Curve, MarketEnvironment, RiskFactorKey, Table};
use riskbook_core::types::{Currency, Date};
use riskbook_models::instruments::Product;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::error::LoaderError;
use super::DataLoader;
use crate::portfolio::Portfolio;
use crate::scenarios::HistoricalScenarios;

/// Instrument records.
pub const PORTFOLIO_FILE: &str = "portfolio.json";
/// Valuation date and market data.
pub const MARKET_FILE: &str = "market.json";
/// Daily relative factor moves.
pub const HISTORY_FILE: &str = "historical_scenarios.csv";

const OPEN: &str = "Open";
const DATE_COLUMN: &str = "Date";

#[derive(Debug, Deserialize)]
struct PortfolioFile {
    #[serde(default)]
    id: Option<String>,
    positions: Vec<PositionRecord>,
}

#[derive(Debug, Deserialize)]
struct PositionRecord {
    status: String,
    #[serde(default)]
    units: f64,
    /// Held only as the underlying of another record.
    #[serde(default)]
    underlying_only: bool,
    #[serde(default)]
    underlying_id: Option<String>,
    instrument: Value,
}

impl PositionRecord {
    fn instrument_id(&self) -> Option<&str> {
        self.instrument.get("id").and_then(Value::as_str)
    }

    fn is_stock(&self) -> bool {
        self.instrument.get("type").and_then(Value::as_str) == Some("Stock")
    }
}

#[derive(Debug, Deserialize)]
struct MarketHeader {
    valuation_date: Date,
}

#[derive(Debug, Deserialize)]
struct MarketFile {
    valuation_date: Date,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    constants: BTreeMap<String, f64>,
    #[serde(default)]
    lists: BTreeMap<String, Table>,
    #[serde(default)]
    curves: BTreeMap<String, Curve>,
    #[serde(default)]
    matrices: BTreeMap<String, Table>,
    #[serde(default)]
    surfaces: BTreeMap<String, Table>,
}

/// Reads `portfolio.json`, `market.json` and `historical_scenarios.csv`
/// from one directory.
///
/// `portfolio.json` holds position records:
///
/// ```json
/// {
///   "id": "Book",
///   "positions": [
///     { "status": "Open", "units": 0, "underlying_only": true,
///       "instrument": { "type": "Stock", "id": "RY", "currency": "CAD" } },
///     { "status": "Open", "units": 10, "underlying_id": "RY",
///       "instrument": { "type": "EquityOption", "id": "RY-C", "currency": "CAD",
///                       "expiration_date": "2018-06-01", "strike": 100.0,
///                       "option_type": "Call" } }
///   ]
/// }
/// ```
///
/// Only `Open` records become positions. A record with `underlying_id`
/// receives the stock record of that ID as its `underlying`.
///
/// `market.json` is a single snapshot. Loading it for a date other than its
/// own `valuation_date` keeps the data, dates the environment at the
/// requested date and logs a warning; use [`JsonDataLoader::market_date`] to
/// check the snapshot date first.
#[derive(Debug, Clone)]
pub struct JsonDataLoader {
    dir: PathBuf,
}

impl JsonDataLoader {
    /// Loader over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory being read.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Valuation date recorded in `market.json`.
    pub fn market_date(&self) -> Result<Date, LoaderError> {
        let header: MarketHeader = self.read_json(MARKET_FILE)?;
        Ok(header.valuation_date)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Result<T, LoaderError> {
        let path = self.path(file);
        let content = fs::read_to_string(&path).map_err(|source| LoaderError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| LoaderError::Json { path, source })
    }
}

impl DataLoader for JsonDataLoader {
    fn load_portfolio(&self, currency: Currency) -> Result<Portfolio, LoaderError> {
        let file: PortfolioFile = self.read_json(PORTFOLIO_FILE)?;
        let path = self.path(PORTFOLIO_FILE);

        let stocks: HashMap<&str, &Value> = file
            .positions
            .iter()
            .filter(|r| r.is_stock())
            .filter_map(|r| r.instrument_id().map(|id| (id, &r.instrument)))
            .collect();

        let mut portfolio = Portfolio::new(file.id.as_deref().unwrap_or("Portfolio"), currency);
        let mut skipped = 0usize;
        for (index, record) in file.positions.iter().enumerate() {
            if record.status != OPEN || record.underlying_only {
                skipped += 1;
                continue;
            }
            let mut instrument = record.instrument.clone();
            if let Some(underlying) = &record.underlying_id {
                let stock = stocks.get(underlying.as_str()).ok_or_else(|| LoaderError::UnknownUnderlying {
                    instrument: record.instrument_id().unwrap_or_default().to_string(),
                    underlying: underlying.clone(),
                })?;
                match instrument.as_object_mut() {
                    Some(fields) => {
                        let mut stock = (*stock).clone();
                        if let Some(stock_fields) = stock.as_object_mut() {
                            stock_fields.remove("type");
                        }
                        fields.insert("underlying".to_string(), stock);
                    }
                    None => {
                        return Err(LoaderError::InvalidRecord {
                            path,
                            record: index,
                            reason: "instrument is not an object".to_string(),
                        })
                    }
                }
            }
            let product: Product = serde_json::from_value(instrument).map_err(|source| LoaderError::Json {
                path: path.clone(),
                source,
            })?;
            portfolio.add_product(product, record.units);
        }

        tracing::info!(
            portfolio = portfolio.id(),
            positions = portfolio.len(),
            skipped,
            "loaded portfolio"
        );
        Ok(portfolio)
    }

    fn load_market_environment(&self, valuation_date: Date) -> Result<MarketEnvironment, LoaderError> {
        let file: MarketFile = self.read_json(MARKET_FILE)?;
        if file.valuation_date != valuation_date {
            tracing::warn!(
                file_date = %file.valuation_date,
                requested = %valuation_date,
                "market data is as of a different date; using the requested date"
            );
        }

        let mut env = MarketEnvironment::new(file.id.as_deref().unwrap_or("Base"), valuation_date);
        for (key, value) in file.constants {
            env.add_constant(key, value);
        }
        for (key, list) in file.lists {
            env.add_list(key, list);
        }
        for (key, curve) in file.curves {
            env.add_curve(key, curve);
        }
        for (key, matrix) in file.matrices {
            env.add_matrix(key, matrix);
        }
        for (key, surface) in file.surfaces {
            env.add_surface(key, surface);
        }

        tracing::info!(
            environment = env.id(),
            date = %valuation_date,
            factors = env.factor_keys().len(),
            "loaded market environment"
        );
        Ok(env)
    }

    fn load_historical_scenarios(&self) -> Result<HistoricalScenarios, LoaderError> {
        let path = self.path(HISTORY_FILE);
        let csv_error = |source| LoaderError::Csv {
            path: path.clone(),
            source,
        };
        let mut reader = csv::Reader::from_path(&path).map_err(csv_error)?;

        let headers = reader.headers().map_err(csv_error)?.clone();
        let date_column = headers
            .iter()
            .position(|h| h.trim() == DATE_COLUMN)
            .ok_or_else(|| LoaderError::InvalidRecord {
                path: path.clone(),
                record: 0,
                reason: format!("missing '{}' column", DATE_COLUMN),
            })?;
        let keys = headers
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != date_column)
            .map(|(_, h)| h.trim().parse::<RiskFactorKey>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut dates = Vec::new();
        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = record.map_err(csv_error)?;
            let invalid = |reason: String| LoaderError::InvalidRecord {
                path: path.clone(),
                record: index,
                reason,
            };
            let date = record
                .get(date_column)
                .ok_or_else(|| invalid("missing date".to_string()))?;
            dates.push(Date::parse(date)?);

            let mut row = Vec::with_capacity(keys.len());
            for (j, field) in record.iter().enumerate() {
                if j == date_column {
                    continue;
                }
                let value = field
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| invalid(format!("value '{}' is not a number", field)))?;
                row.push(value);
            }
            rows.push(row);
        }

        let history = HistoricalScenarios::new(keys, dates, rows)?;
        tracing::info!(
            days = history.len(),
            factors = history.table().keys().len(),
            "loaded historical scenarios"
        );
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use riskbook_models::instruments::Priceable;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        let mut file = fs::File::create(dir.path().join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    const PORTFOLIO: &str = r#"{
        "id": "Book",
        "positions": [
            { "status": "Open", "units": 0, "underlying_only": true,
              "instrument": { "type": "Stock", "id": "RY", "currency": "CAD",
                              "ratings": { "S&P": "AA" }, "industry": "Banks" } },
            { "status": "Open", "units": 100,
              "instrument": { "type": "Stock", "id": "TD", "currency": "CAD" } },
            { "status": "Closed", "units": 50,
              "instrument": { "type": "Stock", "id": "BNS", "currency": "CAD" } },
            { "status": "Open", "units": 10, "underlying_id": "RY",
              "instrument": { "type": "EquityOption", "id": "RY-C", "currency": "CAD",
                              "expiration_date": "2018-06-01", "strike": 100.0,
                              "option_type": "Call" } },
            { "status": "Open", "units": 2500,
              "instrument": { "type": "Cash", "id": "Cash-CAD", "currency": "CAD" } }
        ]
    }"#;

    const MARKET: &str = r#"{
        "valuation_date": "2017-06-01",
        "constants": { "MarketPrice-TD": 62.5, "FXRates-USDCAD": 1.35 },
        "curves": { "RiskFree-Gov-CAD": { "tenors": [1.0, 5.0], "values": [0.01, 0.02] } },
        "matrices": {
            "CreditSpreads-Ratings-CAD": {
                "rows": ["AA", "BBB"], "columns": ["1", "5"],
                "values": [[0.001, 0.002], [0.01, 0.015]]
            }
        }
    }"#;

    #[test]
    fn test_load_portfolio_filters_and_links_underlyings() {
        let dir = TempDir::new().unwrap();
        write(&dir, PORTFOLIO_FILE, PORTFOLIO);
        let portfolio = JsonDataLoader::new(dir.path()).load_portfolio(Currency::CAD).unwrap();

        assert_eq!(portfolio.id(), "Book");
        assert_eq!(portfolio.len(), 3);
        assert_eq!(portfolio.units("TD"), Some(100.0));
        assert_eq!(portfolio.units("BNS"), None);
        assert_eq!(portfolio.units("RY"), None);

        let positions = portfolio.flat_positions();
        let option = positions
            .iter()
            .find_map(|(p, _)| match p {
                Product::EquityOption(o) => Some(o),
                _ => None,
            })
            .unwrap();
        assert_eq!(option.underlying.id, "RY");
        assert_eq!(option.underlying.classification.industry.as_deref(), Some("Banks"));
        assert_eq!(positions.iter().find(|(p, _)| p.id() == "Cash-CAD").map(|(_, u)| *u), Some(2500.0));
    }

    #[test]
    fn test_unknown_underlying_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            PORTFOLIO_FILE,
            r#"{ "positions": [
                { "status": "Open", "units": 1, "underlying_id": "XYZ",
                  "instrument": { "type": "EquityOption", "id": "XYZ-P", "currency": "CAD",
                                  "expiration_date": "2018-06-01", "strike": 10.0,
                                  "option_type": "Put" } } ] }"#,
        );
        let err = JsonDataLoader::new(dir.path()).load_portfolio(Currency::CAD).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::UnknownUnderlying { ref instrument, ref underlying }
                if instrument == "XYZ-P" && underlying == "XYZ"
        ));
    }

    #[test]
    fn test_load_market_environment() {
        let dir = TempDir::new().unwrap();
        write(&dir, MARKET_FILE, MARKET);
        let date = Date::from_ymd(2017, 6, 1).unwrap();
        let env = JsonDataLoader::new(dir.path()).load_market_environment(date).unwrap();

        assert_eq!(env.valuation_date(), date);
        assert_relative_eq!(env.get_constant("MarketPrice-TD").unwrap(), 62.5);
        assert_relative_eq!(env.fx_rate(Currency::CAD, Currency::USD).unwrap(), 1.0 / 1.35, epsilon = 1e-12);
        assert_relative_eq!(
            env.get_matrix_value("CreditSpreads-Ratings-CAD", "BBB", "5").unwrap(),
            0.015
        );
        assert!(env.get_curve("RiskFree-Gov-CAD").is_ok());
    }

    #[test]
    fn test_market_date() {
        let dir = TempDir::new().unwrap();
        write(&dir, MARKET_FILE, MARKET);
        let loader = JsonDataLoader::new(dir.path());
        assert_eq!(loader.market_date().unwrap(), Date::from_ymd(2017, 6, 1).unwrap());
    }

    #[test]
    fn test_requested_date_wins() {
        let dir = TempDir::new().unwrap();
        write(&dir, MARKET_FILE, MARKET);
        let date = Date::from_ymd(2017, 7, 4).unwrap();
        let env = JsonDataLoader::new(dir.path()).load_market_environment(date).unwrap();
        assert_eq!(env.valuation_date(), date);
        assert!(env.get_curve("RiskFree-Gov-CAD").is_ok());
    }

    #[test]
    fn test_load_historical_scenarios() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            HISTORY_FILE,
            "Date,Constants-MarketPrice-TD,Curves-RiskFree-Gov-CAD-1\n\
             2017-05-31,0.01,-0.02\n\
             2017-05-30,-0.005,0.01\n",
        );
        let history = JsonDataLoader::new(dir.path()).load_historical_scenarios().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.dates()[0], Date::from_ymd(2017, 5, 30).unwrap());
        assert_eq!(history.table().keys()[0], RiskFactorKey::constant("MarketPrice-TD"));
        assert_eq!(history.table().row(1), &[0.01, -0.02]);
    }

    #[test]
    fn test_bad_scenario_value() {
        let dir = TempDir::new().unwrap();
        write(&dir, HISTORY_FILE, "Date,Constants-MarketPrice-TD\n2017-05-31,abc\n");
        let err = JsonDataLoader::new(dir.path()).load_historical_scenarios().unwrap_err();
        assert!(matches!(err, LoaderError::InvalidRecord { record: 0, .. }));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = JsonDataLoader::new(dir.path()).load_portfolio(Currency::CAD).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }
}
