use criterion::{black_box, criterion_group, criterion_main, Criterion};

use flagmaster_core::dataset::{validate_dataset, Dataset};
use flagmaster_core::model::{GameMode, Stage};
use flagmaster_core::options::{build_options, distractor_pool};
use flagmaster_core::random::game_rng;
use flagmaster_core::{EngineConfig, QuizEngine};

fn bench_build_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_options");
    let dataset = Dataset::builtin().unwrap();
    let countries = dataset.countries();
    let mut rng = game_rng(Some(42));

    group.bench_function("name", |b| {
        b.iter(|| build_options(black_box(countries), "France", Stage::Name, &mut rng))
    });

    group.bench_function("currency_with_repeats", |b| {
        b.iter(|| build_options(black_box(countries), "Euro", Stage::Currency, &mut rng))
    });

    group.bench_function("distractor_pool", |b| {
        b.iter(|| distractor_pool(black_box(countries), "Paris", Stage::Capital))
    });

    group.finish();
}

fn bench_dataset(c: &mut Criterion) {
    let mut group = c.benchmark_group("dataset");

    group.bench_function("parse_builtin", |b| b.iter(Dataset::builtin));

    let dataset = Dataset::builtin().unwrap();
    group.bench_function("validate_builtin", |b| {
        b.iter(|| validate_dataset(black_box(&dataset)))
    });

    group.finish();
}

fn bench_session_start(c: &mut Criterion) {
    let mut engine = QuizEngine::new(
        Dataset::builtin().unwrap(),
        game_rng(Some(7)),
        EngineConfig::default(),
    )
    .unwrap();

    c.bench_function("start_session", |b| {
        b.iter(|| engine.start_session(black_box(GameMode::Normal)))
    });
}

criterion_group!(benches, bench_build_options, bench_dataset, bench_session_start);
criterion_main!(benches);
