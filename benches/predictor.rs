use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fintrack_core::{normalize_records, predict, SummaryService};
use fintrack_domain::{Transaction, TransactionKind, TransactionRecord};

const NAMES: &[(&str, &str)] = &[
    ("Morning coffee", "Food"),
    ("Uber to office", "Transport"),
    ("Netflix monthly", "Entertainment"),
    ("Rent March", "Bills"),
    ("Gym membership", "Health"),
    ("Corner bakery", "Food"),
];

fn build_history(count: usize) -> Vec<Transaction> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
    (0..count)
        .map(|idx| {
            let (name, category) = NAMES[idx % NAMES.len()];
            Transaction::new(
                format!("{name} {idx}"),
                TransactionKind::Expense,
                category,
                5.0 + (idx % 50) as f64,
                start + Duration::hours(idx as i64),
            )
            .with_id(format!("t-{idx}"))
        })
        .collect()
}

fn bench_predict(c: &mut Criterion) {
    let history = build_history(black_box(5_000));
    let categories: Vec<String> = ["Food", "Transport", "Entertainment", "Bills", "Health"]
        .iter()
        .map(|name| name.to_string())
        .collect();

    c.bench_function("predict_history_5k", |b| {
        b.iter(|| black_box(predict(Some("coffee with friends"), &history, &categories)))
    });

    c.bench_function("predict_no_match_5k", |b| {
        b.iter(|| black_box(predict(Some("zzz qqq"), &history, &categories)))
    });
}

fn bench_projection(c: &mut Criterion) {
    let history = build_history(black_box(10_000));
    let records: Vec<TransactionRecord> =
        history.iter().map(TransactionRecord::from_transaction).collect();

    c.bench_function("normalize_records_10k", |b| {
        b.iter(|| black_box(normalize_records(&records, "Other")))
    });

    c.bench_function("summarize_10k", |b| {
        b.iter(|| black_box(SummaryService::summarize(&history)))
    });
}

criterion_group!(benches, bench_predict, bench_projection);
criterion_main!(benches);
