//! Integration tests: instruments priced against one shared market.

use approx::assert_relative_eq;
use proptest::prelude::*;
use riskbook_core::market::{Curve, MarketEnvironment, RiskCategory, Table};
use riskbook_core::types::{Currency, Date};
use riskbook_models::analytical::{BlackScholes, OptionType};
use riskbook_models::instruments::{
    Bond, CashAccount, CreditDefaultSwap, EquityOption, Priceable, Product, Stock,
};
use riskbook_models::schedules::Frequency;

fn d(y: i32, m: u32, day: u32) -> Date {
    Date::from_ymd(y, m, day).unwrap()
}

fn labels(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn market() -> MarketEnvironment {
    let mut env = MarketEnvironment::new("base", d(2017, 6, 1));
    env.add_curve("RiskFree-Gov-CAD", Curve::flat(0.04));
    env.add_constant("IdiosyncraticSpread-GOC", 0.0);
    env.add_constant("IdiosyncraticHazardRate-CDS-X", 0.0);
    env.add_constant("MarketPrice-ABC", 40.0);
    env.add_constant("DividendYields-ABC", 0.0);
    env.add_surface(
        "ImpliedVols-CAD-ABC",
        Table::new(labels(&["0.5", "2"]), labels(&["0.8", "1.2"]), vec![vec![0.3, 0.3], vec![0.3, 0.3]])
            .unwrap(),
    );
    env.add_matrix(
        "CreditSpreads-Ratings-CAD",
        Table::new(
            labels(&["AAA", "BBB"]),
            labels(&["1", "10"]),
            vec![vec![0.001, 0.002], vec![0.01, 0.02]],
        )
        .unwrap(),
    );
    env.add_list("RecoveryRates", Table::list(labels(&["Senior"]), vec![0.4]).unwrap());
    env.add_matrix(
        "HazardRates-Ratings",
        Table::new(labels(&["BBB"]), labels(&["Hazard"]), vec![vec![0.0]]).unwrap(),
    );
    env
}

fn products() -> Vec<Product> {
    let stock = Stock::new("ABC", Currency::CAD);
    vec![
        CashAccount::new("CASH", Currency::CAD).into(),
        stock.clone().into(),
        Bond::fixed("GOC", Currency::CAD, d(2016, 12, 1), d(2026, 12, 1), 4.0, Frequency::SemiAnnual)
            .with_rating("AAA")
            .into(),
        EquityOption::new("ABC-P40", stock, d(2018, 6, 1), 40.0, OptionType::Put).into(),
        CreditDefaultSwap::new(
            "CDS-X",
            Currency::CAD,
            "X Corp",
            d(2017, 3, 20),
            d(2020, 3, 20),
            1e6,
            50.0,
            "RiskFree-Gov-CAD",
        )
        .with_rating("BBB")
        .into(),
    ]
}

#[test]
fn test_every_product_values_against_its_declared_factors() {
    let env = market();
    for product in products() {
        let value = product.value(&env).unwrap();
        assert!(value.is_finite(), "{} produced {}", product.id(), value);

        // A copy holding only the declared factors must price the same.
        let mut reduced = MarketEnvironment::new("reduced", env.valuation_date());
        for (category, name) in product.market_risk_factors().iter() {
            match category {
                RiskCategory::Constant => reduced.add_constant(name, env.get_constant(name).unwrap()),
                RiskCategory::List => reduced.add_list(name, env.get_list(name).unwrap().clone()),
                RiskCategory::Curve => reduced.add_curve(name, env.get_curve(name).unwrap().clone()),
                RiskCategory::Matrix => reduced.add_matrix(name, env.get_matrix(name).unwrap().clone()),
                RiskCategory::Surface => {
                    reduced.add_surface(name, env.get_surface(name).unwrap().clone())
                }
            }
        }
        assert_eq!(product.value(&reduced).unwrap(), value, "{}", product.id());
    }
}

#[test]
fn test_par_bond_at_coupon_date() {
    let env = market();
    let bond = Bond::fixed("GOC", Currency::CAD, d(2016, 12, 1), d(2026, 12, 1), 4.0, Frequency::SemiAnnual)
        .with_rating("AAA");
    let value = bond.value(&env).unwrap();
    assert!((value - 100.0).abs() < 0.1, "value {}", value);
}

#[test]
fn test_aaa_bond_ignores_rating_spreads() {
    let env = market();
    let aaa = Bond::fixed("GOC", Currency::CAD, d(2016, 12, 1), d(2026, 12, 1), 4.0, Frequency::SemiAnnual)
        .with_rating("AAA");
    let bbb = aaa.clone().with_rating("BBB");

    let mut without_spreads = MarketEnvironment::new("no-spreads", env.valuation_date());
    without_spreads.add_curve("RiskFree-Gov-CAD", Curve::flat(0.04));
    without_spreads.add_constant("IdiosyncraticSpread-GOC", 0.0);

    assert_eq!(aaa.value(&env).unwrap(), aaa.value(&without_spreads).unwrap());
    assert!(bbb.value(&env).unwrap() < aaa.value(&env).unwrap());
}

#[test]
fn test_cds_without_default_risk_has_no_protection() {
    let env = market();
    let cds = CreditDefaultSwap::new(
        "CDS-X",
        Currency::CAD,
        "X Corp",
        d(2017, 3, 20),
        d(2020, 3, 20),
        1e6,
        50.0,
        "RiskFree-Gov-CAD",
    )
    .with_rating("BBB");
    let value = cds.value(&env).unwrap();
    // Twelve quarterly premiums of 1250, discounted.
    assert!(value < 0.0 && value > -15_000.0);
}

#[test]
fn test_missing_factor_names_instrument_and_key() {
    let env = MarketEnvironment::new("empty", d(2017, 6, 1));
    for product in products().into_iter().skip(1) {
        let err = product.value(&env).unwrap_err();
        assert_eq!(err.instrument, product.id());
        let (category, key) = err.missing_factor().unwrap();
        assert!(product.market_risk_factors().contains(category, key), "{}", key);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn put_call_parity_through_option_contract(spot in 20.0_f64..60.0, strike in 30.0_f64..50.0) {
        let mut env = market();
        env.add_constant("MarketPrice-ABC", spot);
        let stock = Stock::new("ABC", Currency::CAD);
        let call = EquityOption::new("C", stock.clone(), d(2018, 6, 1), strike, OptionType::Call);
        let put = EquityOption::new("P", stock, d(2018, 6, 1), strike, OptionType::Put);

        let parity = call.value(&env).unwrap() - put.value(&env).unwrap();
        prop_assert!((parity - (spot - strike * (-0.04_f64).exp())).abs() < 1e-8);
    }

    #[test]
    fn option_exposure_matches_model_delta(spot in 30.0_f64..50.0) {
        let mut env = market();
        env.add_constant("MarketPrice-ABC", spot);
        let call = EquityOption::new("C", Stock::new("ABC", Currency::CAD), d(2018, 6, 1), 40.0, OptionType::Call);
        let model = BlackScholes::new(spot, 0.04, 0.0, 0.3).unwrap();
        let expected = model.delta(OptionType::Call, 40.0, 1.0) * spot;
        prop_assert!((call.exposure(&env).unwrap() - expected).abs() < 1e-9);
    }
}

#[test]
fn test_portfolio_json_round_trip() {
    let json = serde_json::to_string(&products()).unwrap();
    let back: Vec<Product> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, products());
    let env = market();
    assert_relative_eq!(back[1].value(&env).unwrap(), 40.0);
}
