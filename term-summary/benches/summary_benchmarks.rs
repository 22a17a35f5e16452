//! Benchmarks for the three analyzers and batch dispatch.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::fmt::Write as _;
use std::hint::black_box;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use term_summary::analyzers::text::summarize_text;
use term_summary::analyzers::{FileAnalyzer, RecordAnalyzer, TabularAnalyzer};
use term_summary::prelude::*;
use tokio::runtime::Runtime;

fn write_csv(dir: &TempDir, rows: usize) -> PathBuf {
    let mut content = String::from("id,price,category\n");
    for i in 0..rows {
        let _ = writeln!(content, "{i},{}.{:02},cat_{}", i % 997, i % 100, i % 13);
    }
    let path = dir.path().join(format!("rows_{rows}.csv"));
    std::fs::write(&path, content).unwrap();
    path
}

fn text_corpus(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("line {i} mail user{i}@example.com or call 555 123 {:03}\n", i % 1000))
        .collect()
}

fn bench_tabular(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let dir = TempDir::new().unwrap();
    let analyzer = TabularAnalyzer::new();

    let mut group = c.benchmark_group("tabular_summary");
    group.measurement_time(Duration::from_secs(10));

    for rows in [100, 1_000, 10_000] {
        let path = write_csv(&dir, rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &path, |b, path| {
            b.iter(|| rt.block_on(analyzer.summarize(black_box(path))).unwrap());
        });
    }

    group.finish();
}

fn bench_record(c: &mut Criterion) {
    let analyzer = RecordAnalyzer::new();
    let mut group = c.benchmark_group("record_summary");

    for len in [100, 10_000] {
        let document = json!({
            "ids": (0..len).collect::<Vec<_>>(),
            "scores": (0..len).map(|i| i as f64 * 0.5).collect::<Vec<_>>(),
            "labels": (0..len).map(|i| format!("label_{}", i % 50)).collect::<Vec<_>>(),
        });
        group.bench_with_input(BenchmarkId::from_parameter(len), &document, |b, document| {
            b.iter(|| analyzer.summarize_value(black_box(document)).unwrap());
        });
    }

    group.finish();
}

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_summary");

    for lines in [100, 2_000] {
        let corpus = text_corpus(lines);
        group.bench_with_input(BenchmarkId::from_parameter(lines), &corpus, |b, corpus| {
            b.iter(|| summarize_text(black_box(corpus)));
        });
    }

    group.finish();
}

fn bench_dispatch_many(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..8).map(|i| write_csv(&dir, 500 + i)).collect();

    let mut group = c.benchmark_group("dispatch_many");
    group.measurement_time(Duration::from_secs(10));

    for concurrency in [1, 4] {
        let dispatcher =
            Dispatcher::with_config(SummaryConfig::default().with_max_concurrency(concurrency))
                .unwrap();
        group.bench_with_input(
            BenchmarkId::new("concurrency", concurrency),
            &paths,
            |b, paths| {
                b.iter(|| rt.block_on(dispatcher.dispatch_many(black_box(paths))));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_tabular,
    bench_record,
    bench_text,
    bench_dispatch_many
);
criterion_main!(benches);
