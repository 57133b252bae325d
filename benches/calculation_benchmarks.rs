//! Performance benchmarks for the timesheet sync engine.
//!
//! Covers the hot paths of a large import or all-employees read:
//! - Duration codec over provider `HH:MM` strings
//! - Risk tier classification
//! - Full compliance assessment of one employee
//! - Tolerant parsing of a columnar totals payload
//! - Assessing a whole period of 1000 employees
//! - In-process response cache hits
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use serde_json::json;
use std::time::Duration;

use timesheet_sync::cache::{CacheKey, InMemoryResponseCache, ResponseCache};

use timesheet_sync::calculation::{assess_compliance, classify_balance, format_duration, parse_duration};
use timesheet_sync::config::ComplianceConfig;
use timesheet_sync::models::{LedgerDuration, Period, TotalsSnapshot};
use timesheet_sync::upstream::parse::parse_totals;

fn snapshot(balance: &str) -> TotalsSnapshot {
    TotalsSnapshot {
        normal: LedgerDuration::parse("168:00"),
        absence: LedgerDuration::parse("08:00"),
        overtime_50: LedgerDuration::parse("12:45"),
        overtime_100: LedgerDuration::parse("03:30"),
        bank_credit: LedgerDuration::parse("20:15"),
        bank_debit: LedgerDuration::parse("04:00"),
        bank_balance: LedgerDuration::parse(balance),
    }
}

/// Benchmark: parsing and formatting single durations.
fn bench_duration_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("duration_codec");

    for input in ["00:00", "-02:30", "1234:59", ""] {
        group.bench_with_input(BenchmarkId::new("parse", input), &input, |b, input| {
            b.iter(|| parse_duration(black_box(Some(input))))
        });
    }

    let hours = Decimal::new(-1_254_167, 5);
    group.bench_function("format", |b| b.iter(|| format_duration(black_box(hours))));

    group.finish();
}

/// Benchmark: tier classification across the three bands.
fn bench_classify(c: &mut Criterion) {
    let balances = [Decimal::new(15, 0), Decimal::new(-3050, 2), Decimal::new(4001, 2)];
    c.bench_function("classify_balance", |b| {
        b.iter(|| {
            for balance in &balances {
                black_box(classify_balance(black_box(*balance)));
            }
        })
    });
}

/// Benchmark: one employee's full assessment.
fn bench_assessment(c: &mut Criterion) {
    let config = ComplianceConfig::default();
    let totals = snapshot("-27:45");
    let period = Period::new(2025, 2).unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

    c.bench_function("assess_compliance", |b| {
        b.iter(|| assess_compliance(black_box(&totals), period, &config, today))
    });
}

/// Benchmark: tolerant parsing of the columnar provider shape.
fn bench_parse_totals(c: &mut Criterion) {
    let payload = json!({
        "Colunas": ["Normais", "Faltas", "Ex50%", "Ex100%", "BCred.", "BDeb.", "BSaldo"],
        "Totais": ["168:00", "08:00", "12:45", "03:30", "20:15", "04:00", "-27:45"]
    });
    c.bench_function("parse_totals_columnar", |b| {
        b.iter(|| parse_totals(black_box(&payload)))
    });
}

/// Benchmark: assessing every employee of a large period.
fn bench_period_of_1000(c: &mut Criterion) {
    let config = ComplianceConfig::default();
    let period = Period::new(2025, 2).unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
    let rows: Vec<TotalsSnapshot> = (0..1000)
        .map(|i| snapshot(&format!("{}{:02}:{:02}", if i % 2 == 0 { "-" } else { "" }, i % 60, i % 60)))
        .collect();

    let mut group = c.benchmark_group("period_assessment");
    group.throughput(Throughput::Elements(rows.len() as u64));
    group.bench_function("assess_1000", |b| {
        b.iter(|| {
            rows.iter()
                .map(|totals| assess_compliance(totals, period, &config, today))
                .collect::<Vec<_>>()
        })
    });
    group.finish();
}

/// Benchmark: serving a cached all-employees payload.
fn bench_cache_hit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cache = InMemoryResponseCache::new();
    let params = json!({ "periodStart": "2025-02-01", "periodEnd": "2025-02-28" });
    let key = CacheKey::new("all-employees-totals", &params);
    let payload = json!({
        "employees": (0..200).map(|i| json!({ "employee": { "name": format!("E{i}") } })).collect::<Vec<_>>()
    });
    rt.block_on(cache.set(&key, &payload, Duration::from_secs(1800)))
        .unwrap();

    c.bench_function("cache_hit_200_employees", |b| {
        b.to_async(&rt).iter(|| async { black_box(cache.get(&key).await.unwrap()) })
    });
}

criterion_group!(
    benches,
    bench_duration_codec,
    bench_classify,
    bench_assessment,
    bench_parse_totals,
    bench_period_of_1000,
    bench_cache_hit,
);
criterion_main!(benches);
