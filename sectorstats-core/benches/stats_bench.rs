//! Criterion benchmarks for the statistics hot paths.
//!
//! Benchmarks:
//! 1. Full summary over one company column
//! 2. Per-bucket statistics over a four-company dataset
//! 3. Pooled plus per-bucket correlation matrices

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use sectorstats_core::correlation::pooled_and_per_bucket;
use sectorstats_core::domain::BalancedDataset;
use sectorstats_core::stats::{quarterly_stats, Summary};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_dates(n: usize) -> Vec<NaiveDate> {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    (0..n)
        .map(|i| base + chrono::Duration::days(i as i64))
        .collect()
}

fn make_column(n: usize, phase: f64) -> Vec<f64> {
    (0..n)
        .map(|i| 1000.0 + ((i as f64 * 0.1) + phase).sin() * 50.0 + i as f64 * 0.2)
        .collect()
}

fn make_dataset(n: usize) -> BalancedDataset {
    let companies = ["HCL", "Infosys", "TCS", "Wipro"];
    BalancedDataset::new(
        make_dates(n),
        companies.iter().map(|c| c.to_string()).collect(),
        (0..companies.len())
            .map(|c| make_column(n, c as f64))
            .collect(),
    )
    .unwrap()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");
    for n in [250, 1000, 5000] {
        let dates = make_dates(n);
        let values = make_column(n, 0.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| Summary::compute(black_box(&dates), black_box(&values)))
        });
    }
    group.finish();
}

fn bench_quarterly(c: &mut Criterion) {
    let ds = make_dataset(540);
    c.bench_function("quarterly_stats_540_days", |b| {
        b.iter(|| quarterly_stats(black_box(&ds)))
    });
}

fn bench_correlations(c: &mut Criterion) {
    let ds = make_dataset(540);
    c.bench_function("correlations_540_days", |b| {
        b.iter(|| pooled_and_per_bucket(black_box(&ds)))
    });
}

criterion_group!(benches, bench_summary, bench_quarterly, bench_correlations);
criterion_main!(benches);
