//! End-to-end runs of the `riskbook` binary over the sample data directory.

use std::path::PathBuf;
use std::process::{Command, Output};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn riskbook(args: &[&str]) -> Output {
    let root = workspace_root();
    Command::new(env!("CARGO_BIN_EXE_riskbook"))
        .arg("--config")
        .arg(root.join("riskbook.toml"))
        .arg("--data-dir")
        .arg(root.join("data"))
        .args(["--format", "json"])
        .args(args)
        .env("RISKBOOK_MARKET_NUM_SIMS", "500")
        .env("RISKBOOK_CREDIT_NUM_SIMS", "500")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run riskbook")
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "riskbook failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn value_reports_open_positions_only() {
    let report = json(&riskbook(&["value"]));
    let positions = report["positions"].as_object().unwrap();
    assert!(positions.contains_key("RY"));
    assert!(positions.contains_key("RY-C-85"));
    assert!(!positions.contains_key("BNS"));
    assert_eq!(report["currency"], "CAD");
    assert_eq!(report["valuation_date"], "2017-06-01");
    assert!(report["value"].as_f64().unwrap() > 0.0);
}

#[test]
fn historical_var_decomposes_by_position() {
    let report = json(&riskbook(&["var", "--method", "historical", "--marginal"]));
    let var = report["var"].as_f64().unwrap();
    let es = report["es"].as_f64().unwrap();
    assert!(var < 0.0);
    assert!(es <= var);

    let total: f64 = report["contributions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["risk_contribution"].as_f64().unwrap())
        .sum();
    assert!((total - var).abs() < 1e-6 * var.abs().max(1.0));
}

#[test]
fn stress_runs_every_preset() {
    let report = json(&riskbook(&["stress", "--crisis"]));
    let presets = report["presets"].as_array().unwrap();
    assert_eq!(presets.len(), 2);
    assert_eq!(presets[0]["scenario"], "adverse");
    assert!(presets[0]["pnl"].as_f64().unwrap() < 0.0);
    assert_eq!(report["crises"].as_array().unwrap().len(), 2);
}

#[test]
fn credit_var_is_a_loss() {
    let report = json(&riskbook(&["credit-var"]));
    assert_eq!(report["simulations"], 500);
    assert!(report["var"].as_f64().unwrap() <= 0.0);
}

#[test]
fn unknown_preset_fails() {
    let output = riskbook(&["stress", "--preset", "meteor"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown preset scenario: meteor"));
}
