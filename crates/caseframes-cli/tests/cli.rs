use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn caseframes() -> Command {
    Command::cargo_bin("caseframes").unwrap()
}

#[test]
fn inspect_lists_tables() {
    let case = repo_path("test_data/case9.m");
    caseframes()
        .args(["inspect", case.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("case9"))
        .stdout(predicate::str::contains("gencost"))
        .stdout(predicate::str::contains("MODEL,STARTUP,SHUTDOWN,NCOST,C2,C1,C0"));
}

#[test]
fn inspect_json_summary() {
    let case = repo_path("test_data/case4_pwl.m");
    let output = caseframes()
        .args(["inspect", case.to_str().unwrap(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["baseMVA"], 100.0);
    let bus = summary["tables"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "bus")
        .unwrap();
    assert_eq!(bus["rows"], 4);
}

#[test]
fn inspect_resolves_bare_name() {
    let case = repo_path("test_data/case9");
    caseframes()
        .args(["inspect", case.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("branch"));
}

#[test]
fn unknown_field_is_reported() {
    let case = repo_path("test_data/case9_load.m");
    caseframes()
        .args(["inspect", case.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("load"));

    caseframes()
        .args(["--allow-any-keys", "inspect", case.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("load"));
}

#[test]
fn missing_case_fails() {
    caseframes()
        .args(["inspect", "does/not/exist.m"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn convert_to_json() {
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("case9.json");
    let case = repo_path("test_data/case9.m");
    caseframes()
        .args([
            "convert",
            case.to_str().unwrap(),
            "--to",
            "json",
            "-o",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["name"], "case9");
    assert_eq!(json["bus"].as_array().unwrap().len(), 9);

    // The written JSON loads again as a case.
    caseframes()
        .args(["inspect", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("gencost"));
}

#[test]
fn convert_to_csv_with_reset_index() {
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("tables");
    let case = repo_path("test_data/case4_pwl.m");
    caseframes()
        .args([
            "convert",
            case.to_str().unwrap(),
            "--to",
            "csv",
            "-o",
            out.to_str().unwrap(),
            "--reset-index",
        ])
        .assert()
        .success();

    let branch = fs::read_to_string(out.join("branch.csv")).unwrap();
    let first = branch.lines().nth(1).unwrap();
    assert!(first.starts_with("0,0,1,"), "{first}");
}

#[test]
fn convert_per_unit() {
    let out_dir = tempdir().unwrap();
    let out = out_dir.path().join("pu.json");
    let case = repo_path("test_data/case9.m");
    caseframes()
        .args([
            "convert",
            case.to_str().unwrap(),
            "--to",
            "json",
            "-o",
            out.to_str().unwrap(),
            "--per-unit",
        ])
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    // gen 1 PMAX is 250 MW on a 100 MVA base
    let pmax = json["gen"][0][8].as_f64().unwrap();
    assert!((pmax - 2.5).abs() < 1e-12);
}

#[test]
fn columns_prints_template() {
    caseframes()
        .args(["columns", "branch"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("F_BUS\nT_BUS\n"));
}

#[test]
fn columns_for_cost_field_omits_placeholder() {
    caseframes()
        .args(["columns", "gencost"])
        .assert()
        .success()
        .stdout("MODEL\nSTARTUP\nSHUTDOWN\nNCOST\n")
        .stderr(predicate::str::contains("C0"));
}

#[test]
fn columns_honors_config_overrides() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("caseframes.toml");
    fs::write(&config, "[columns]\nload = [\"BUS\", \"P\", \"Q\"]\n").unwrap();
    caseframes()
        .args(["--config", config.to_str().unwrap(), "columns", "load"])
        .assert()
        .success()
        .stdout("BUS\nP\nQ\n");

    caseframes()
        .args(["columns", "load"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no column template"));
}
