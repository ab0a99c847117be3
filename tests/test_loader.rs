//! Integration tests for ledger loading and row extraction

use std::path::Path;

use polars::prelude::*;
use rfmseg::pipeline::{
    extract_transactions, load_ledger, profile_dataset, run_rfm_pipeline, LedgerColumns,
    RfmError, SegmentConfig,
};
use rust_decimal_macros::dec;

#[path = "common/mod.rs"]
mod common;

use common::{create_temp_ledger_csv, create_temp_ledger_parquet, sample_csv_rows};

#[test]
fn test_load_csv_ledger() {
    let rows = sample_csv_rows();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let (_dir, path) = create_temp_ledger_csv(&refs);

    let df = load_ledger(&path, None).unwrap();
    assert_eq!(df.height(), rows.len());
    assert_eq!(df.width(), 8);

    let transactions = extract_transactions(&df, &LedgerColumns::default(), None).unwrap();
    assert_eq!(transactions.len(), rows.len());
    assert_eq!(transactions[0].invoice_no, "536365");
    assert_eq!(transactions[0].unit_price, dec!(2.55));
    assert_eq!(transactions[0].customer_id, Some(17850));
    assert!(transactions[2].is_cancellation());
    assert!(transactions[3].description.is_none());
    assert!(transactions[4].customer_id.is_none());
}

#[test]
fn test_csv_leading_zeros_survive_as_text() {
    let (_dir, path) = create_temp_ledger_csv(&[
        "000123,00456,TEA CUP,2,1.50,12346,Norway,2011-01-18 10:01:00",
    ]);

    let df = load_ledger(&path, None).unwrap();
    let transactions = extract_transactions(&df, &LedgerColumns::default(), None).unwrap();

    assert_eq!(transactions[0].invoice_no, "000123");
    assert_eq!(transactions[0].stock_code, "00456");
}

#[test]
fn test_profile_counts_anonymous_rows() {
    let rows = sample_csv_rows();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let (_dir, path) = create_temp_ledger_csv(&refs);

    let df = load_ledger(&path, None).unwrap();
    let profile = profile_dataset(&df, "CustomerID").unwrap();

    assert_eq!(profile.rows, rows.len());
    let expected = 2.0 / rows.len() as f64 * 100.0;
    assert!((profile.anonymous_pct - expected).abs() < 1e-9);
}

#[test]
fn test_load_parquet_ledger() {
    let mut df = df! {
        "InvoiceNo" => ["536365", "536366"],
        "StockCode" => ["85123A", "22633"],
        "Description" => ["WHITE HANGING HEART T-LIGHT HOLDER", "HAND WARMER UNION JACK"],
        "Quantity" => [6i64, 6],
        "UnitPrice" => [2.55f64, 1.85],
        "CustomerID" => [Some(17850i64), None],
        "Country" => ["United Kingdom", "United Kingdom"],
        "InvoiceDate" => ["2010-12-01 08:26:00", "2010-12-01 08:28:00"],
    }
    .unwrap();
    let (_dir, path) = create_temp_ledger_parquet(&mut df);

    let loaded = load_ledger(&path, None).unwrap();
    let transactions = extract_transactions(&loaded, &LedgerColumns::default(), None).unwrap();

    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].quantity, 6);
    assert_eq!(transactions[1].unit_price, dec!(1.85));
    assert_eq!(transactions[1].customer_id, None);
}

#[test]
fn test_renamed_columns() {
    let (_dir, path) = create_temp_ledger_csv(&[]);
    std::fs::write(
        &path,
        "Invoice,StockCode,Description,Quantity,UnitPrice,Customer,Country,Timestamp\n\
         1,A,MUG,1,3.00,5,Spain,18/01/2011 10:01\n",
    )
    .unwrap();

    let columns = LedgerColumns {
        invoice_no: "Invoice".to_string(),
        customer_id: "Customer".to_string(),
        invoice_date: "Timestamp".to_string(),
        ..Default::default()
    };
    let df = load_ledger(&path, None).unwrap();
    let transactions = extract_transactions(&df, &columns, Some("%d/%m/%Y %H:%M")).unwrap();

    assert_eq!(transactions[0].customer_id, Some(5));
    assert_eq!(transactions[0].invoice_date.format("%Y-%m-%d").to_string(), "2011-01-18");
}

#[test]
fn test_malformed_quantity_names_row() {
    let (_dir, path) = create_temp_ledger_csv(&[
        "1,A,MUG,1,3.00,5,Spain,2011-01-18 10:01:00",
        "2,B,BOWL,lots,3.00,5,Spain,2011-01-18 10:02:00",
    ]);

    let df = load_ledger(&path, None).unwrap();
    let err = extract_transactions(&df, &LedgerColumns::default(), None).unwrap_err();

    match err {
        RfmError::MalformedValue { column, row, .. } => {
            assert_eq!(column, "Quantity");
            assert_eq!(row, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_blank_country_is_rejected() {
    let (_dir, path) = create_temp_ledger_csv(&[
        "1,A,MUG,1,3.00,5,Spain,2011-01-18 10:01:00",
        "2,B,BOWL,2,3.00,5,,2011-01-18 10:02:00",
    ]);

    let df = load_ledger(&path, None).unwrap();
    let err = extract_transactions(&df, &LedgerColumns::default(), None).unwrap_err();

    assert!(matches!(err, RfmError::MissingValue { ref column, row: 1 } if column == "Country"));
}

#[test]
fn test_csv_to_analysis() {
    let rows = sample_csv_rows();
    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let (_dir, path) = create_temp_ledger_csv(&refs);

    let df = load_ledger(&path, None).unwrap();
    let transactions = extract_transactions(&df, &LedgerColumns::default(), None).unwrap();
    let analysis = run_rfm_pipeline(&transactions, &SegmentConfig::default()).unwrap();

    assert_eq!(analysis.cleaning.raw_rows, 25);
    assert_eq!(analysis.cleaning.missing_description, 1);
    assert_eq!(analysis.cleaning.cancellations, 1);
    assert_eq!(analysis.cleaning.negative_quantity, 1);
    assert_eq!(analysis.cleaning.clean_rows, 23);
    // 17850 plus twenty French customers; 14527 only cancelled.
    assert_eq!(analysis.customers.len(), 21);
    assert_eq!(analysis.anonymous_lines, 1);
}

#[test]
fn test_missing_file_is_reported() {
    let err = load_ledger(Path::new("/nonexistent/ledger.csv"), None).unwrap_err();
    assert!(!err.to_string().is_empty());
}
