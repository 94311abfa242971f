mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;

use common::{SCENARIO_A, TestWorkspace, fixture_path};

fn cleaner_cmd() -> Command {
    let mut cmd = Command::cargo_bin("claims-cleaner").expect("binary exists");
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn cleans_csv_and_prints_report() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("claims.csv", SCENARIO_A);

    cleaner_cmd()
        .arg(&input)
        .assert()
        .success()
        .stdout(contains("Rows:    3 → 3 → 2"))
        .stdout(contains("Columns: 5 → 5"))
        .stdout(contains("Duplicate rows removed: 1"))
        .stdout(contains("Date columns normalized: DOB, DOS"))
        .stdout(contains("skipped (not present): 6 of the default names"))
        .stdout(contains("Date format: YYYY-MM-DD"));

    let output = workspace.read("cleaned_claims.csv");
    let lines = output.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "101,1980-01-02,2025-01-05,200,follow-up");
}

#[test]
fn unsupported_extension_fails_without_output() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("claims.txt", SCENARIO_A);

    cleaner_cmd()
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("UnsupportedFormatError"))
        .stderr(contains(".txt"));
    assert!(!workspace.exists("cleaned_claims.csv"));
}

#[test]
fn missing_input_reports_file_not_found() {
    let workspace = TestWorkspace::new();

    cleaner_cmd()
        .arg(workspace.path().join("nope.csv"))
        .assert()
        .failure()
        .stderr(contains("FileNotFoundError"));
}

#[test]
fn explicit_out_and_json_report() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("claims.csv", SCENARIO_A);
    let output = workspace.path().join("nested").join("final.csv");
    let report = workspace.path().join("report.json");

    cleaner_cmd()
        .arg(&input)
        .arg("--out")
        .arg(&output)
        .arg("--report-json")
        .arg(&report)
        .assert()
        .success()
        .stdout(contains("final.csv"));

    assert!(output.exists());
    assert!(!workspace.exists("cleaned_claims.csv"));
    let json: serde_json::Value =
        serde_json::from_str(&workspace.read("report.json")).expect("parse report json");
    assert_eq!(json["duplicate_rows"], 1);
    assert_eq!(json["stages"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["date_formats"]["canonical_format"], "YYYY-MM-DD");
}

#[test]
fn date_cols_restricts_normalization() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("claims.csv", SCENARIO_A);

    cleaner_cmd()
        .arg(&input)
        .args(["--date-cols", "DOS,AdmitDate"])
        .assert()
        .success()
        .stdout(contains("Date columns normalized: DOS"))
        .stdout(contains("Date columns skipped (not present): AdmitDate"));

    let output = workspace.read("cleaned_claims.csv");
    assert!(output.contains("101,01/02/1980,2025-01-05"));
}

#[test]
fn unparseable_values_can_be_cleared() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("claims.csv", "ClaimID,DOB\n101,N/A\n102,01/02/1980\n");

    cleaner_cmd()
        .arg(&input)
        .args(["--unparseable-dates", "clear"])
        .assert()
        .success()
        .stdout(contains("partially normalized: DOB"));

    assert_eq!(
        workspace.read("cleaned_claims.csv"),
        "ClaimID,DOB\n101,\n102,1980-01-02\n"
    );
}

#[test]
fn yaml_config_is_applied_and_cli_overrides_it() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("claims.csv", "ClaimID;Visit\n1;03/04/2024\n1;2024-03-04\n");
    let config = workspace.write(
        "cleaner.yaml",
        "dates:\n  names: [Visit]\noutput_prefix: tidy_\ndelimiter: ','\n",
    );

    cleaner_cmd()
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .args(["--delimiter", ";"])
        .assert()
        .success()
        .stdout(contains("2 → 2 → 1"));

    assert_eq!(workspace.read("tidy_claims.csv"), "ClaimID,Visit\n1,2024-03-04\n");
}

#[test]
fn invalid_config_is_rejected() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("claims.csv", SCENARIO_A);
    let config = workspace.write(
        "cleaner.yaml",
        "dates:\n  canonical_format: '%Y-%m-%d %H:%M'\n",
    );

    cleaner_cmd()
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("Loading configuration"));
    assert!(!workspace.exists("cleaned_claims.csv"));
}

#[test]
fn xlsx_sheet_option_selects_sheet() {
    let workspace = TestWorkspace::new();
    let input = workspace.copy_fixture("claims.xlsx");

    cleaner_cmd()
        .arg(&input)
        .args(["--sheet", "Archive"])
        .assert()
        .success()
        .stdout(contains("Date columns normalized: DOS"));

    assert_eq!(
        workspace.read("cleaned_claims.csv"),
        "ClaimID,DOS\n900,2024-03-04\n"
    );
}

#[test]
fn fixture_csv_is_not_modified() {
    let workspace = TestWorkspace::new();
    let fixture = fixture_path("claims.csv");
    let before = std::fs::read_to_string(&fixture).expect("read fixture");
    let output = workspace.path().join("out.csv");

    cleaner_cmd()
        .arg(&fixture)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(contains("Rows:").and(contains("Cleaning report")));

    assert_eq!(std::fs::read_to_string(&fixture).expect("reread fixture"), before);
}
