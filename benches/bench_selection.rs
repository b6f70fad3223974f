use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use evosel::{
    fitness::FitnessFunction,
    rng::RandomNumberGenerator,
    selection::{RankExponentialRWS, RankExponentialSUS, SelectionStrategy},
};

fn bench_selection(c: &mut Criterion) {
    let landscape = FitnessFunction::hamming(100.0).unwrap();
    let rws = RankExponentialRWS::new(0.9801).unwrap();
    let sus = RankExponentialSUS::new(0.9801).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(42);

    let mut group = c.benchmark_group("rank_exponential_selection");
    for size in [100, 1000, 10000].iter() {
        let population = landscape
            .generate_population(*size, 100, true, &mut rng)
            .unwrap();

        group.bench_function(&format!("rws_{}", size), |b| {
            b.iter_batched(
                || population.clone(),
                |p| rws.select(black_box(p), &mut rng).unwrap(),
                BatchSize::SmallInput,
            )
        });
        group.bench_function(&format!("sus_{}", size), |b| {
            b.iter_batched(
                || population.clone(),
                |p| sus.select(black_box(p), &mut rng).unwrap(),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_generation(c: &mut Criterion) {
    let landscape = FitnessFunction::hamming(100.0).unwrap();
    let sus = RankExponentialSUS::new(0.9801).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(7);
    let population = landscape.generate_population(100, 100, true, &mut rng).unwrap();

    c.bench_function("generation_sus_crossover_mutation_100", |b| {
        b.iter_batched(
            || population.clone(),
            |p| {
                sus.select(p, &mut rng)
                    .unwrap()
                    .crossover(&landscape, 1.0, &mut rng)
                    .unwrap()
                    .mutate(&landscape, 0.00001, &mut rng)
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_selection, bench_generation);
criterion_main!(benches);
