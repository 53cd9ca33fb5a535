use lifegrid::*;
use pretty_assertions::assert_eq;

fn glider_at(size: usize, row: i64, col: i64) -> CellGrid {
  let glider = pattern::find("Glider").unwrap();
  pattern::stamp(&CellGrid::new(size, size), glider, row, col)
}

#[test]
fn glider_moves_one_cell_every_four_generations() {
  let mut uni = Universe::new(8, 8);
  uni.load_state(glider_at(8, 0, 0), 0);

  uni.simulate(4);
  assert_eq!(uni.grid(), &glider_at(8, 1, 1));

  uni.simulate(4);
  assert_eq!(uni.grid(), &glider_at(8, 2, 2));
}

#[test]
fn glider_wraps_around_torus() {
  let mut uni = Universe::new(8, 8);
  uni.load_state(glider_at(8, 5, 5), 0);
  uni.simulate(32);
  assert_eq!(uni.generation(), 32);
  assert_eq!(uni.grid(), &glider_at(8, 5, 5));
  assert_eq!(uni.live_cells(), 5);
}

#[test]
fn glider_dies_against_finite_edge() {
  let mut uni = Universe::new(8, 8);
  uni.set_boundary(BoundaryMode::Finite);
  uni.load_state(glider_at(8, 5, 5), 0);
  uni.simulate(32);
  assert_ne!(uni.grid(), &glider_at(8, 5, 5));
  assert!(uni.live_cells() <= 4);
}

#[test]
fn multi_simulate() {
  let glider_0 = "#N g\nx = 5, y = 5\nbo3b$2bo2b$3o2b$5b$5b!";
  let glider_1 = "#N g\nx = 5, y = 5\n5b$obo2b$b2o2b$bo3b$5b!";
  let glider_2 = "#N g\nx = 5, y = 5\n5b$2bo2b$obo2b$b2o2b$5b!";
  let mut uni = Universe::new(5, 5);
  uni.load_state(rle::read(glider_0).unwrap().grid, 0);

  uni.step();
  assert_eq!(uni.pattern_text("g"), glider_1);

  uni.step();
  assert_eq!(uni.pattern_text("g"), glider_2);

  uni.step_back();
  uni.step_back();
  assert_eq!(uni.pattern_text("g"), glider_0);
}

#[test]
fn highlife_replicator_copies_itself() {
  let mut uni = Universe::new(40, 40);
  uni.set_notation("B36/S23").unwrap();
  let replicator = pattern::find("Replicator").unwrap();
  assert_eq!(replicator.ruleset.as_deref(), Some("B36/S23"));
  uni.stamp_centered(replicator);
  uni.simulate(12);
  assert!(uni.live_cells() > replicator.cells.len());
}
