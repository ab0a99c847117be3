//! Benchmark of the segmentation pipeline and quantile scoring
//!
//! Run with: cargo bench --bench segment_benchmark

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand::SeedableRng;
use rust_decimal::Decimal;

use rfmseg::pipeline::{run_rfm_pipeline, score, LabelOrder, SegmentConfig, Transaction};

/// Generate a synthetic ledger with a skewed purchase count per customer
fn generate_ledger(n_lines: usize, n_customers: i64, seed: u64) -> Vec<Transaction> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2010, 12, 1)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .expect("valid start date");

    (0..n_lines)
        .map(|i| {
            // Cubing a uniform draw concentrates purchases on few customers.
            let u: f64 = rng.gen();
            let customer = (u * u * u * n_customers as f64) as i64;
            let cancelled = rng.gen::<f64>() < 0.02;
            Transaction {
                invoice_no: if cancelled {
                    format!("C{}", 536_000 + i / 4)
                } else {
                    format!("{}", 536_000 + i / 4)
                },
                stock_code: format!("{}", 20_000 + rng.gen_range(0..4_000)),
                description: Some("REGENCY CAKESTAND 3 TIER".to_string()),
                quantity: if cancelled { -1 } else { rng.gen_range(1..48) },
                unit_price: Decimal::new(rng.gen_range(10..2_000), 2),
                customer_id: if rng.gen::<f64>() < 0.25 { None } else { Some(12_000 + customer) },
                country: "United Kingdom".to_string(),
                invoice_date: start + Duration::minutes(rng.gen_range(0..60 * 24 * 373)),
            }
        })
        .collect()
}

/// Benchmark the full pipeline for growing ledgers
fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("rfm_pipeline");
    let config = SegmentConfig::default();

    for &n_lines in &[10_000usize, 100_000, 500_000] {
        let ledger = generate_ledger(n_lines, 4_000, 42);
        group.throughput(Throughput::Elements(n_lines as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n_lines), &ledger, |b, ledger| {
            b.iter(|| run_rfm_pipeline(black_box(ledger), black_box(&config)))
        });
    }

    group.finish();
}

/// Benchmark quantile fitting plus scoring on one measure
fn benchmark_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantile_score");
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);

    for &n in &[1_000usize, 10_000, 100_000] {
        let values: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() * 10_000.0).collect();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| score(black_box(values), LabelOrder::Ascending, None))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_pipeline, benchmark_scoring);
criterion_main!(benches);
