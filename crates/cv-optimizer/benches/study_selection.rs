//! 研究選擇效能基準

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cv_core::MachineId;
use cv_optimizer::{select_studies, StudyCandidate};
use std::collections::BTreeSet;

fn candidates(trains: u32, machines_per_train: u32) -> Vec<StudyCandidate> {
    (1..=trains)
        .map(|id| {
            let start = id * 3;
            let machines: BTreeSet<MachineId> = (start..start + machines_per_train).collect();
            StudyCandidate::new(id, (id * 37) % 250, machines)
        })
        .collect()
}

fn bench_select_studies(c: &mut Criterion) {
    let candidates = candidates(500, 12);
    let universe: BTreeSet<MachineId> = candidates
        .iter()
        .flat_map(|c| c.machines.iter().copied())
        .collect();

    c.bench_function("select_studies_500_trains", |b| {
        b.iter(|| select_studies(black_box(&candidates), black_box(&universe)))
    });
}

criterion_group!(benches, bench_select_studies);
criterion_main!(benches);
