//! Pipeline benchmark: events → feature aggregation, and difficulty scoring.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use learning_intel::config::SyntheticConfig;
use learning_intel::difficulty;
use learning_intel::events::{generate, Event};
use learning_intel::features::{FeatureMatrix, FEATURE_SCHEMA};

fn cohort(students: u32) -> Vec<Event> {
    generate(&SyntheticConfig { students, seed: 42 })
        .into_iter()
        .map(|r| r.event)
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let mut g = c.benchmark_group("aggregate_by_students");
    for n in [100, 1000, 5000] {
        let events = cohort(n);
        g.bench_function(format!("students_{}", n).as_str(), |b| {
            b.iter(|| FeatureMatrix::from_events(black_box(&events), &FEATURE_SCHEMA))
        });
    }
    g.finish();
}

fn bench_difficulty(c: &mut Criterion) {
    let events = cohort(1000);
    c.bench_function("difficulty_1000_students", |b| {
        b.iter(|| difficulty::score(black_box(&events)))
    });
}

criterion_group!(benches, bench_aggregation, bench_difficulty);
criterion_main!(benches);
