//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rfmseg::pipeline::Transaction;
use rust_decimal::Decimal;
use tempfile::TempDir;

pub const LEDGER_HEADER: &str =
    "InvoiceNo,StockCode,Description,Quantity,UnitPrice,CustomerID,Country,InvoiceDate";

/// Parse a "%Y-%m-%d %H:%M:%S" timestamp
pub fn ts(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// First day of the synthetic ledgers, 08:00
pub fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2010, 12, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

/// Build a single well-formed ledger line
pub fn line(
    customer: Option<i64>,
    invoice: &str,
    quantity: i64,
    unit_price: Decimal,
    at: NaiveDateTime,
) -> Transaction {
    Transaction {
        invoice_no: invoice.to_string(),
        stock_code: "85123A".to_string(),
        description: Some("WHITE HANGING HEART T-LIGHT HOLDER".to_string()),
        quantity,
        unit_price,
        customer_id: customer,
        country: "United Kingdom".to_string(),
        invoice_date: at,
    }
}

/// Customer 42 buys 10.00, 20.00 and 30.00 on invoices I1, I1, I2;
/// customer 7 buys five days after 42's last purchase.
pub fn customer_42_ledger() -> Vec<Transaction> {
    vec![
        line(Some(42), "I1", 1, Decimal::new(1000, 2), ts("2011-03-01 10:00:00")),
        line(Some(42), "I1", 2, Decimal::new(1000, 2), ts("2011-03-01 10:00:00")),
        line(Some(42), "I2", 3, Decimal::new(1000, 2), ts("2011-03-04 09:30:00")),
        line(Some(7), "I3", 1, Decimal::new(500, 2), ts("2011-03-09 09:30:00")),
    ]
}

/// Random ledger with `customers` identified buyers plus anonymous and dirty lines.
pub fn random_ledger(customers: i64, lines: usize, seed: u64) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = epoch();

    (0..lines)
        .map(|i| {
            let customer = if rng.gen_bool(0.1) {
                None
            } else {
                Some(12_000 + rng.gen_range(0..customers))
            };
            let cancelled = rng.gen_bool(0.02);
            let invoice = if cancelled {
                format!("C{}", 536_000 + i / 3)
            } else {
                format!("{}", 536_000 + i / 3)
            };
            let quantity = if cancelled { -rng.gen_range(1..12) } else { rng.gen_range(1..24) };
            let mut tx = line(
                customer,
                &invoice,
                quantity,
                Decimal::new(rng.gen_range(10..5_000), 2),
                start + Duration::minutes(rng.gen_range(0..60 * 24 * 365)),
            );
            if rng.gen_bool(0.01) {
                tx.description = None;
            }
            tx
        })
        .collect()
}

/// Write raw CSV lines under the ledger header into a temporary directory
pub fn create_temp_ledger_csv(rows: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("ledger.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "{}", LEDGER_HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }

    (temp_dir, csv_path)
}

/// A small ledger of CSV rows covering every cleaning rule
pub fn sample_csv_rows() -> Vec<String> {
    let mut rows = vec![
        "536365,85123A,WHITE HANGING HEART T-LIGHT HOLDER,6,2.55,17850,United Kingdom,2010-12-01 08:26:00".to_string(),
        "536365,71053,WHITE METAL LANTERN,6,3.39,17850,United Kingdom,2010-12-01 08:26:00".to_string(),
        "C536379,D,Discount,-1,27.50,14527,United Kingdom,2010-12-01 09:41:00".to_string(),
        "536414,22139,,56,0,,United Kingdom,2010-12-01 11:52:00".to_string(),
        "536544,21773,DECORATIVE ROSE BATHROOM BOTTLE,1,2.51,,United Kingdom,2010-12-01 14:32:00".to_string(),
    ];
    for i in 0..20 {
        rows.push(format!(
            "5370{:02},22633,HAND WARMER UNION JACK,{},1.85,{},France,2010-12-{:02} 10:00:00",
            i,
            i + 1,
            13_000 + i,
            i + 2
        ));
    }
    rows
}

/// Write a ledger DataFrame (string columns) as Parquet into a temporary directory
pub fn create_temp_ledger_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("ledger.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}
