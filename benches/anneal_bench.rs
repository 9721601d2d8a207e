//! Criterion benchmarks for u-anneal.
//!
//! Uses the reference models so the numbers measure engine overhead:
//! the annealing loop, event publication and archive maintenance.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use std::sync::Arc;
use u_anneal::annealer::{Annealer, AnnealerBuilder, AnnealerKind};
use u_anneal::archive::{ModelCompressor, NonDominatedArchive};
use u_anneal::explorer::{KirkpatrickExplorer, SuppapitnarmExplorer};
use u_anneal::model::{DumbModel, Model, MultiObjectiveDumbModel};
use u_anneal::observer::InvariantObserver;
use u_anneal::random::create_rng;

// ===========================================================================
// Annealing loops
// ===========================================================================

fn kirkpatrick(iterations: u64, checked: bool) -> Box<dyn Annealer> {
    let mut builder = AnnealerBuilder::new(AnnealerKind::Simple)
        .with_starting_temperature(10.0)
        .with_cooling_factor(0.997)
        .with_maximum_iterations(iterations)
        .with_explorer(Box::new(
            KirkpatrickExplorer::new(Box::new(DumbModel::new())).with_seed(42),
        ));
    if checked {
        builder = builder.with_observer(Arc::new(InvariantObserver::new()));
    }
    match builder.build() {
        Ok(annealer) => annealer,
        Err(e) => panic!("{e}"),
    }
}

fn bench_kirkpatrick(c: &mut Criterion) {
    let mut group = c.benchmark_group("kirkpatrick_dumb_model");
    group.sample_size(20);

    for &iterations in &[1_000u64, 10_000] {
        for checked in [false, true] {
            let label = if checked { "invariant" } else { "bare" };
            let prototype = kirkpatrick(iterations, checked);
            group.bench_with_input(
                BenchmarkId::new(label, iterations),
                &prototype,
                |b, prototype| {
                    b.iter(|| {
                        let mut annealer = prototype.clone_annealer();
                        black_box(annealer.anneal())
                    })
                },
            );
        }
    }
    group.finish();
}

fn bench_suppapitnarm(c: &mut Criterion) {
    let mut group = c.benchmark_group("suppapitnarm_modumb");
    group.sample_size(10);

    for &actions in &[20usize, 100] {
        let explorer = SuppapitnarmExplorer::new(Box::new(MultiObjectiveDumbModel::new(actions, 7)))
            .with_seed(42)
            .with_cooling_factor(0.995)
            .with_archive_size(50);
        let prototype = match AnnealerBuilder::new(AnnealerKind::Simple)
            .with_starting_temperature(5.0)
            .with_maximum_iterations(2_000)
            .with_explorer(Box::new(explorer))
            .build()
        {
            Ok(annealer) => annealer,
            Err(e) => panic!("{e}"),
        };
        group.bench_with_input(BenchmarkId::from_parameter(actions), &prototype, |b, prototype| {
            b.iter(|| {
                let mut annealer = prototype.clone_annealer();
                black_box(annealer.anneal())
            })
        });
    }
    group.finish();
}

// ===========================================================================
// Archive
// ===========================================================================

fn random_model(actions: usize, seed: u64, rng: &mut StdRng) -> MultiObjectiveDumbModel {
    match MultiObjectiveDumbModel::new(actions, seed).with_random_actions(rng) {
        Ok(model) => model,
        Err(e) => panic!("{e}"),
    }
}

fn bench_archive_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("archive_insertion");
    group.sample_size(20);

    for &capacity in &[25usize, 100] {
        let mut rng = create_rng(9);
        let states: Vec<MultiObjectiveDumbModel> = (0..500)
            .map(|_| random_model(64, 3, &mut rng))
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &states, |b, states| {
            b.iter(|| {
                let mut archive = match NonDominatedArchive::for_model(&states[0], capacity) {
                    Ok(archive) => archive,
                    Err(e) => panic!("{e}"),
                };
                for state in states {
                    let _ = black_box(archive.try_store(state));
                }
                black_box(archive.len())
            })
        });
    }
    group.finish();
}

fn bench_compressor(c: &mut Criterion) {
    let mut rng = create_rng(5);
    let source = random_model(1_000, 1, &mut rng);
    let mut destination: Box<dyn Model> = Box::new(MultiObjectiveDumbModel::new(1_000, 1));
    let compressor = ModelCompressor;

    c.bench_function("compress_restore_1000_actions", |b| {
        b.iter(|| {
            let state = compressor.compress(black_box(&source));
            black_box(compressor.decompress(&state, destination.as_mut()))
        })
    });
}

criterion_group!(
    benches,
    bench_kirkpatrick,
    bench_suppapitnarm,
    bench_archive_insertion,
    bench_compressor
);
criterion_main!(benches);
