//! Tests for CLI argument parsing and end-to-end runs of the binary

use assert_cmd::Command;
use clap::Parser;
use predicates::prelude::*;
use rfmseg::cli::Cli;
use std::path::PathBuf;

#[path = "common/mod.rs"]
mod common;

use common::{create_temp_ledger_csv, sample_csv_rows};

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["rfmseg", "-i", "ledger.csv"]);

    assert_eq!(cli.invoice_column, "InvoiceNo");
    assert_eq!(cli.customer_column, "CustomerID");
    assert_eq!(cli.date_column, "InvoiceDate");
    assert!(cli.timestamp_format.is_none());
    assert!(!cli.no_frequency_fallback);
    assert!(!cli.bundle);
    assert!(!cli.no_confirm, "Default no_confirm should be false");

    let config = cli.segment_config().unwrap();
    assert!(config.frequency_fallback);
    assert!(config.recency_clip.is_none());
    assert!(config.monetary_clip.is_none());
}

#[test]
fn test_cli_output_path_derivation() {
    let cli = Cli::parse_from(["rfmseg", "-i", "/path/to/ledger.csv"]);

    assert_eq!(cli.output_path(), PathBuf::from("/path/to/ledger_rfm.csv"));
    assert_eq!(
        cli.analysis_path(),
        PathBuf::from("/path/to/ledger_rfm_analysis.json")
    );
    assert_eq!(cli.bundle_path(), PathBuf::from("/path/to/ledger_rfm_report.zip"));
}

#[test]
fn test_cli_output_path_derivation_parquet_and_xlsx() {
    let parquet = Cli::parse_from(["rfmseg", "-i", "/data/ledger.parquet"]);
    assert_eq!(parquet.output_path(), PathBuf::from("/data/ledger_rfm.parquet"));

    let xlsx = Cli::parse_from(["rfmseg", "-i", "/data/Online Retail.xlsx"]);
    assert_eq!(xlsx.output_path(), PathBuf::from("/data/Online Retail_rfm.csv"));
}

#[test]
fn test_cli_explicit_output_path() {
    let cli = Cli::parse_from(["rfmseg", "-i", "ledger.csv", "-o", "segments.parquet"]);
    assert_eq!(cli.output_path(), PathBuf::from("segments.parquet"));
}

#[test]
fn test_cli_clip_bounds() {
    let cli = Cli::parse_from([
        "rfmseg",
        "-i",
        "ledger.csv",
        "--monetary-clip-lower",
        "0",
        "--monetary-clip-upper",
        "5000",
        "--recency-clip-upper",
        "365",
    ]);

    let config = cli.segment_config().unwrap();
    let monetary = config.monetary_clip.unwrap();
    assert_eq!(monetary.lower, 0.0);
    assert_eq!(monetary.upper, 5000.0);
    assert_eq!(config.recency_clip.unwrap().upper, 365.0);
}

#[test]
fn test_cli_inverted_clip_is_rejected() {
    let cli = Cli::parse_from([
        "rfmseg",
        "-i",
        "ledger.csv",
        "--monetary-clip-lower",
        "100",
        "--monetary-clip-upper",
        "10",
    ]);
    assert!(cli.segment_config().is_err());
}

#[test]
fn test_cli_non_finite_clip_is_rejected() {
    let result = Cli::try_parse_from(["rfmseg", "-i", "ledger.csv", "--frequency-clip-upper", "inf"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_requires_input() {
    assert!(Cli::try_parse_from(["rfmseg"]).is_err());
}

#[test]
fn test_binary_writes_all_outputs() {
    let rows = sample_csv_rows();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let (dir, path) = create_temp_ledger_csv(&refs);

    Command::cargo_bin("rfmseg")
        .unwrap()
        .arg("-i")
        .arg(&path)
        .arg("--no-confirm")
        .arg("--bundle")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("RFM segmentation complete")
                .and(predicate::str::contains("negative quantity (observed)")),
        );

    let table = dir.path().join("ledger_rfm.csv");
    let analysis = dir.path().join("ledger_rfm_analysis.json");
    assert!(table.exists());
    assert!(analysis.exists());
    assert!(dir.path().join("ledger_rfm_report.zip").exists());

    let csv = std::fs::read_to_string(table).unwrap();
    let header = csv.lines().next().unwrap();
    assert_eq!(
        header,
        "customer_id,recency,frequency,monetary,r_score,f_score,m_score,rfm_score,category"
    );
    assert_eq!(csv.lines().count(), 22);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(analysis).unwrap()).unwrap();
    assert_eq!(json["customers_scored"], 21);
    assert_eq!(json["cleaning"]["cancellations"], 1);
    assert_eq!(json["distribution"].as_array().unwrap().len(), 5);
}

#[test]
fn test_binary_reports_missing_column() {
    let (_dir, path) = create_temp_ledger_csv(&[]);
    std::fs::write(&path, "InvoiceNo,Quantity\n1,2\n").unwrap();

    Command::cargo_bin("rfmseg")
        .unwrap()
        .arg("-i")
        .arg(&path)
        .arg("--no-confirm")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CustomerID"));
}

#[test]
fn test_binary_rejects_missing_input() {
    Command::cargo_bin("rfmseg")
        .unwrap()
        .args(["-i", "/nonexistent/ledger.csv", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}
