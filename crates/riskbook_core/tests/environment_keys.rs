//! Integration tests: structured keys against a populated environment.

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use riskbook_core::market::{Curve, MarketEnvironment, RiskFactorKey, Table};
use riskbook_core::types::Date;

fn labels(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

fn environment() -> MarketEnvironment {
    let mut env = MarketEnvironment::new("base", Date::from_ymd(2017, 6, 1).unwrap());
    env.add_constant("MarketPrice-ABC", 52.0);
    env.add_constant("FXRates-USDCAD", 1.34);
    env.add_curve(
        "RiskFree-Gov-CAD",
        Curve::new(vec![0.25, 0.5, 1.0, 5.0, 10.0], vec![0.006, 0.007, 0.009, 0.012, 0.016]).unwrap(),
    );
    env.add_matrix(
        "CreditSpreads-Ratings-CAD",
        Table::new(
            labels(&["A", "BBB+", "BBB-"]),
            labels(&["1", "5", "10"]),
            vec![
                vec![0.004, 0.006, 0.008],
                vec![0.009, 0.011, 0.013],
                vec![0.014, 0.017, 0.020],
            ],
        )
        .unwrap(),
    );
    env.add_list(
        "DefaultProbability",
        Table::list(labels(&["A", "BBB+", "BBB-"]), vec![0.0007, 0.0015, 0.003]).unwrap(),
    );
    env.add_surface(
        "ImpliedVols-CAD-ABC",
        Table::new(
            labels(&["0.5", "1"]),
            labels(&["0.9", "1", "1.1"]),
            vec![vec![0.25, 0.22, 0.21], vec![0.24, 0.21, 0.2]],
        )
        .unwrap(),
    );
    env
}

#[test]
fn every_listed_key_survives_the_legacy_form() {
    let env = environment();
    for key in env.factor_keys() {
        let legacy = key.to_string();
        let parsed: RiskFactorKey = legacy.parse().unwrap();
        assert_eq!(parsed, key, "{}", legacy);
        assert!(env.get_value(&parsed).is_ok(), "{}", legacy);
    }
}

#[test]
fn shocked_copies_do_not_leak_into_the_base() {
    let base = environment();
    let keys = base.factor_keys();
    let shocked: Vec<MarketEnvironment> = keys
        .iter()
        .map(|k| base.with_value(k, base.get_value(k).unwrap() + 1.0).unwrap())
        .collect();

    for (k, env) in keys.iter().zip(&shocked) {
        assert_abs_diff_eq!(env.get_value(k).unwrap(), base.get_value(k).unwrap() + 1.0);
    }
    assert_eq!(base.get_constant("MarketPrice-ABC").unwrap(), 52.0);
    assert_eq!(base.get_curve("RiskFree-Gov-CAD").unwrap().values()[0], 0.006);
}

proptest! {
    #[test]
    fn shift_and_unshift_restores_values(
        idx in 0usize..24,
        delta in -0.5f64..0.5,
    ) {
        let base = environment();
        let keys = base.factor_keys();
        let key = &keys[idx % keys.len()];
        let v0 = base.get_value(key).unwrap();

        let up = base.with_value(key, v0 + delta).unwrap();
        let back = up.with_value(key, up.get_value(key).unwrap() - delta).unwrap();

        prop_assert!((back.get_value(key).unwrap() - v0).abs() < 1e-12);
    }
}
