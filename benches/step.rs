use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lifegrid::universe::step;
use lifegrid::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn step_benchmark(c: &mut Criterion) {
  let mut rng = StdRng::seed_from_u64(0x11fe);
  let grid = CellGrid::from_fn(100, 100, |_, _| rng.gen_bool(0.3));
  let ages = AgeGrid::new(100, 100);

  c.bench_function("step 100x100 toroidal", |b| b.iter(|| {
    step(black_box(&grid), &ages, BoundaryMode::Toroidal, GAME_OF_LIFE)
  }));

  c.bench_function("universe 100 generations", |b| b.iter(|| {
    let mut uni = Universe::new(100, 100);
    uni.load_state(grid.clone(), 0);
    uni.simulate(black_box(100));
  }));
}

criterion_group!(benches, step_benchmark);
criterion_main!(benches);
