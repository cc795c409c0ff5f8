use boids_engine::{
    flock::Flock,
    options::{SimulationSettings, Viewport},
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn flock_update(c: &mut Criterion) {
    let viewport = Viewport::new(1280., 720.);
    let mut group = c.benchmark_group("flock update");

    for num_boids in [100, 500] {
        let settings = SimulationSettings {
            num_boids,
            ..Default::default()
        };
        let mut flock = Flock::new(&settings, &viewport, 42);

        group.bench_with_input(BenchmarkId::from_parameter(num_boids), &settings, |b, settings| {
            b.iter(|| flock.update(black_box(settings), black_box(&viewport)))
        });
    }

    group.finish();
}

fn wraparound_update(c: &mut Criterion) {
    let viewport = Viewport::new(1280., 720.);
    let settings = SimulationSettings {
        num_boids: 500,
        wraparound_mode: true,
        ..Default::default()
    };
    let mut flock = Flock::new(&settings, &viewport, 42);

    c.bench_function("flock update wraparound 500", |b| {
        b.iter(|| flock.update(black_box(&settings), black_box(&viewport)))
    });
}

criterion_group!(benches, flock_update, wraparound_update);
criterion_main!(benches);
