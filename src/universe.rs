use std::collections::VecDeque;
use std::mem;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use crate::config::{ConfigError, EngineConfig};
use crate::grid::{AgeGrid, CellGrid, GridError};
use crate::history::{HistoryBuffer, HistoryEntry};
use crate::neighbor::{self, BoundaryMode};
use crate::pattern::{self, Pattern};
use crate::rle;
use crate::rule::{self, Rule, RuleError, Ruleset, GAME_OF_LIFE};
use crate::share::{self, ShareError};

/// Compute the next generation and its ages.
///
/// Every cell reads only `grid`, never the generation being built. A cell
/// alive afterwards has age `previous age + 1` if it was alive before and
/// `1` if it was just born; dead cells have age 0.
pub fn step(
  grid: &CellGrid,
  ages: &AgeGrid,
  boundary: BoundaryMode,
  rule: Rule,
) -> (CellGrid, AgeGrid) {
  let width = grid.width();
  let height = grid.height();
  let mut next = Vec::with_capacity(width * height);
  let mut next_ages = Vec::with_capacity(width * height);

  for row in 0..height {
    for col in 0..width {
      let alive = grid.is_alive(row, col);
      let live_neighbors = neighbor::count(grid, row, col, boundary);
      let next_alive = rule.apply(alive, live_neighbors);
      let age = if !next_alive {
        0
      } else if alive {
        ages.get(row, col).copied().unwrap_or(0).saturating_add(1)
      } else {
        1
      };
      next.push(next_alive);
      next_ages.push(age);
    }
  }

  (
    CellGrid::from_cells(width, height, next),
    AgeGrid::from_cells(width, height, next_ages),
  )
}

/// Number of population samples a [`Universe`] keeps.
pub const POPULATION_WINDOW: usize = 100;

/// Live cell count after a step.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct PopulationSample {
  pub generation: u64,
  pub live: usize,
}

/// A running simulation: the current grid with its ages, the generation
/// counter, the rule and boundary in effect, and the step-back history.
///
/// Methods run to completion synchronously; a host driving the universe
/// from a timer must not call into it reentrantly.
#[derive(Clone, Debug)]
pub struct Universe {
  grid: CellGrid,
  ages: AgeGrid,
  generation: u64,
  /// live cells before the most recent step
  previous_live: usize,
  boundary: BoundaryMode,
  ruleset: Ruleset,
  rule: Rule,
  history: HistoryBuffer,
  population: VecDeque<PopulationSample>,
  random_density: f64,
}

impl Universe {
  /// An empty Game of Life universe on a torus.
  ///
  /// # Panics
  ///
  /// If `width * height` overflows `usize`.
  pub fn new(width: usize, height: usize) -> Self {
    let ruleset = Ruleset::default();
    Self {
      grid: CellGrid::new(width, height),
      ages: AgeGrid::new(width, height),
      generation: 0,
      previous_live: 0,
      boundary: BoundaryMode::default(),
      rule: GAME_OF_LIFE,
      ruleset,
      history: HistoryBuffer::new(),
      population: VecDeque::new(),
      random_density: 0.3,
    }
  }

  pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    let ruleset = config.ruleset()?;
    debug!(
      width = config.width,
      height = config.height,
      rule = %ruleset.notation,
      "creating universe"
    );
    Ok(Self {
      boundary: config.boundary,
      rule: ruleset.rule()?,
      ruleset,
      history: HistoryBuffer::with_capacity(config.history_capacity),
      random_density: config.random_density,
      ..Self::new(config.width, config.height)
    })
  }

  pub fn grid(&self) -> &CellGrid {
    &self.grid
  }

  pub fn ages(&self) -> &AgeGrid {
    &self.ages
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn width(&self) -> usize {
    self.grid.width()
  }

  pub fn height(&self) -> usize {
    self.grid.height()
  }

  pub fn boundary(&self) -> BoundaryMode {
    self.boundary
  }

  pub fn ruleset(&self) -> &Ruleset {
    &self.ruleset
  }

  pub fn history(&self) -> &HistoryBuffer {
    &self.history
  }

  pub fn live_cells(&self) -> usize {
    self.grid.live_count()
  }

  /// Percentage of live cells.
  pub fn population_density(&self) -> f64 {
    self.grid.density()
  }

  /// Change in population caused by the most recent step, `None` before
  /// the first generation.
  pub fn growth_rate(&self) -> Option<i64> {
    if self.generation == 0 {
      None
    } else {
      Some(self.live_cells() as i64 - self.previous_live as i64)
    }
  }

  /// Live cell counts after each of the most recent steps, oldest first.
  /// Cleared whenever the grid is replaced.
  pub fn population_history(&self) -> &VecDeque<PopulationSample> {
    &self.population
  }

  /// The first sample with the highest population.
  pub fn peak_population(&self) -> Option<PopulationSample> {
    self.population.iter().rev().max_by_key(|sample| sample.live).copied()
  }

  pub fn toggle(&mut self, row: usize, col: usize) -> Result<bool, GridError> {
    let alive = self.grid.toggle(row, col)?;
    if !alive {
      self.ages.set(row, col, 0)?;
    }
    Ok(alive)
  }

  pub fn step(&mut self) {
    let (grid, ages) = step(&self.grid, &self.ages, self.boundary, self.rule);
    self.previous_live = self.grid.live_count();
    let before = HistoryEntry {
      grid: mem::replace(&mut self.grid, grid),
      ages: mem::replace(&mut self.ages, ages),
    };
    self.history.push(before);
    self.generation += 1;

    if self.population.len() == POPULATION_WINDOW {
      self.population.pop_front();
    }
    self.population.push_back(PopulationSample {
      generation: self.generation,
      live: self.live_cells(),
    });
    trace!(generation = self.generation, live = self.live_cells(), "step");
  }

  /// Advance `num_gen` generations.
  pub fn simulate(&mut self, num_gen: usize) {
    for _ in 0..num_gen {
      self.step();
    }
  }

  pub fn can_step_back(&self) -> bool {
    self.history.can_pop()
  }

  /// Restore the grid and ages from before the last step. Returns `false`
  /// when there is no history.
  pub fn step_back(&mut self) -> bool {
    let entry = match self.history.pop() {
      Some(entry) => entry,
      None => return false,
    };
    self.grid = entry.grid;
    self.ages = entry.ages;
    self.generation = self.generation.saturating_sub(1);
    while matches!(self.population.back(), Some(s) if s.generation > self.generation) {
      self.population.pop_back();
    }
    self.previous_live = match self.history.peek() {
      Some(prior) => prior.grid.live_count(),
      None => self.grid.live_count(),
    };
    true
  }

  /// Kill every cell and restart at generation 0.
  pub fn reset(&mut self) {
    let (width, height) = (self.width(), self.height());
    self.replace_grid(CellGrid::new(width, height), 0);
    debug!(width, height, "reset");
  }

  /// Start over with an empty `width` x `height` grid. Sizes above
  /// [`MAX_CELLS`](crate::grid::MAX_CELLS) are rejected and leave the
  /// universe as it was.
  pub fn resize(&mut self, width: usize, height: usize) -> Result<(), GridError> {
    let grid = CellGrid::try_new(width, height)?;
    self.replace_grid(grid, 0);
    debug!(width, height, "resized");
    Ok(())
  }

  pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
    let density = self.random_density;
    let grid = CellGrid::from_fn(self.width(), self.height(), |_, _| rng.gen_bool(density));
    self.replace_grid(grid, 0);
    debug!(live = self.live_cells(), "randomized");
  }

  /// Replace the whole state, e.g. with a decoded share link or a saved
  /// grid. Ages start over and history is dropped.
  pub fn load_state(&mut self, grid: CellGrid, generation: u64) {
    self.replace_grid(grid, generation);
  }

  fn replace_grid(&mut self, grid: CellGrid, generation: u64) {
    self.ages = AgeGrid::new(grid.width(), grid.height());
    self.previous_live = grid.live_count();
    self.grid = grid;
    self.generation = generation;
    self.history.clear();
    self.population.clear();
  }

  /// Turn on the cells of `pattern` placed at `(row, col)`.
  pub fn stamp(&mut self, pattern: &Pattern, row: i64, col: i64) {
    pattern::stamp_into(&mut self.grid, pattern, row, col);
  }

  /// Stamp `pattern` in the middle of the grid. Returns `false` for a
  /// pattern without cells.
  pub fn stamp_centered(&mut self, pattern: &Pattern) -> bool {
    match pattern::centered_origin(self.width(), self.height(), pattern) {
      Some((row, col)) => {
        self.stamp(pattern, row, col);
        true
      }
      None => false,
    }
  }

  pub fn set_ruleset(&mut self, ruleset: Ruleset) -> Result<(), RuleError> {
    let rule = ruleset.rule()?;
    debug!(rule = %ruleset, "ruleset changed");
    self.rule = rule;
    self.ruleset = ruleset;
    Ok(())
  }

  /// Switch to the rule written in B/S notation. The current rule is kept
  /// if `notation` does not parse.
  pub fn set_notation(&mut self, notation: &str) -> Result<(), RuleError> {
    let ruleset = rule::parse(notation)?;
    self.set_ruleset(ruleset)
  }

  pub fn set_boundary(&mut self, boundary: BoundaryMode) {
    self.boundary = boundary;
  }

  pub fn toggle_boundary(&mut self) {
    self.boundary = self.boundary.toggled();
  }

  pub fn share_token(&self) -> String {
    share::encode(&self.grid, self.generation)
  }

  /// Load a share token. On failure the universe is left untouched.
  pub fn load_share_token(&mut self, token: &str) -> Result<(), ShareError> {
    match share::decode(token) {
      Ok(state) => {
        self.load_state(state.grid, state.generation);
        Ok(())
      }
      Err(err) => {
        trace!("ignoring share token: {}", err);
        Err(err)
      }
    }
  }

  pub fn pattern_text(&self, name: &str) -> String {
    rle::write(&self.grid, name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn picture(src: &str) -> CellGrid {
    src.parse().unwrap()
  }

  #[test]
  fn blinker_oscillates() {
    let grid = picture("
      .....
      ..#..
      ..#..
      ..#..
      .....");
    let ages = AgeGrid::new(5, 5);
    let (next, next_ages) = step(&grid, &ages, BoundaryMode::Finite, GAME_OF_LIFE);
    assert_eq!(next.to_string(), ".....\n.....\n.###.\n.....\n.....");
    assert_eq!(next_ages[(2, 2)], 1);
    assert_eq!(next_ages[(2, 1)], 1);

    let (back, back_ages) = step(&next, &next_ages, BoundaryMode::Finite, GAME_OF_LIFE);
    assert_eq!(back, grid);
    assert_eq!(back_ages[(2, 2)], 2);
    assert_eq!(back_ages[(1, 2)], 1);
    assert_eq!(back_ages[(2, 1)], 0);
  }

  #[test]
  fn step_does_not_read_updated_cells() {
    // Updating in place would kill (0, 0) before (1, 1) is evaluated.
    let grid = picture("
      #.#.
      ....
      .#..
      ....");
    let (next, _) = step(&grid, &AgeGrid::new(4, 4), BoundaryMode::Finite, GAME_OF_LIFE);
    assert_eq!(next.to_string(), "....\n.#..\n....\n....");
  }

  #[test]
  fn step_uses_boundary() {
    // Vertical blinker across the top/bottom seam of a torus.
    let grid = picture("
      .#...
      .....
      .....
      .#...
      .#...");
    let ages = AgeGrid::new(5, 5);
    let (torus, _) = step(&grid, &ages, BoundaryMode::Toroidal, GAME_OF_LIFE);
    assert_eq!(torus.to_string(), ".....\n.....\n.....\n.....\n###..");
    let (finite, _) = step(&grid, &ages, BoundaryMode::Finite, GAME_OF_LIFE);
    assert_eq!(finite.live_count(), 0);
  }

  #[test]
  fn block_ages_accumulate() {
    let mut uni = Universe::new(4, 4);
    uni.stamp(pattern::find("Block").unwrap(), 1, 1);
    uni.simulate(3);
    assert_eq!(uni.ages()[(1, 1)], 3);
    assert_eq!(uni.ages()[(0, 0)], 0);
  }

  #[test]
  fn age_resets_after_death() {
    let mut uni = Universe::new(5, 5);
    uni.stamp(pattern::find("Blinker").unwrap(), 2, 1);
    uni.step();
    assert!(!uni.grid()[(2, 1)]);
    assert_eq!(uni.ages()[(2, 1)], 0);
    uni.step();
    assert!(uni.grid()[(2, 1)]);
    assert_eq!(uni.ages()[(2, 1)], 1);
    assert_eq!(uni.ages()[(2, 2)], 2);
  }

  #[test]
  fn step_back_restores_grid_and_ages() {
    let mut uni = Universe::new(6, 6);
    uni.stamp_centered(pattern::find("Glider").unwrap());
    let start = uni.grid().clone();
    uni.simulate(2);
    let ages_at_two = uni.ages().clone();
    let grid_at_two = uni.grid().clone();
    uni.step();

    assert!(uni.step_back());
    assert_eq!(uni.generation(), 2);
    assert_eq!(uni.grid(), &grid_at_two);
    assert_eq!(uni.ages(), &ages_at_two);

    assert!(uni.step_back());
    assert!(uni.step_back());
    assert_eq!(uni.generation(), 0);
    assert_eq!(uni.grid(), &start);
    assert!(!uni.step_back());
    assert_eq!(uni.generation(), 0);
  }

  #[test]
  fn toggle_does_not_record_history() {
    let mut uni = Universe::new(3, 3);
    assert_eq!(uni.toggle(1, 1), Ok(true));
    assert!(!uni.can_step_back());
    assert!(uni.toggle(3, 0).is_err());
  }

  #[test]
  fn reset_clears_history() {
    let mut uni = Universe::new(8, 8);
    uni.randomize(&mut StdRng::seed_from_u64(7));
    uni.simulate(5);
    assert!(uni.can_step_back());

    uni.reset();
    assert_eq!(uni.generation(), 0);
    assert_eq!(uni.live_cells(), 0);
    assert!(!uni.can_step_back());

    uni.simulate(1);
    uni.resize(10, 4).unwrap();
    assert_eq!((uni.width(), uni.height()), (10, 4));
    assert_eq!(uni.ages().width(), 10);
    assert!(!uni.can_step_back());

    assert!(uni.resize(1 << 20, 1 << 20).is_err());
    assert_eq!((uni.width(), uni.height()), (10, 4));
  }

  #[test]
  fn population_history_follows_steps() {
    let mut uni = Universe::new(8, 8);
    uni.stamp(pattern::find("Blinker").unwrap(), 2, 1);
    uni.toggle(6, 6).unwrap();
    assert_eq!(uni.peak_population(), None);

    uni.simulate(3);
    let lives: Vec<_> = uni.population_history().iter().map(|s| (s.generation, s.live)).collect();
    assert_eq!(lives, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(uni.peak_population(), Some(PopulationSample { generation: 1, live: 3 }));

    assert!(uni.step_back());
    assert!(uni.step_back());
    assert_eq!(uni.population_history().len(), 1);

    uni.randomize(&mut StdRng::seed_from_u64(3));
    assert!(uni.population_history().is_empty());
    uni.simulate(POPULATION_WINDOW + 20);
    assert_eq!(uni.population_history().len(), POPULATION_WINDOW);
    assert_eq!(uni.population_history().front().map(|s| s.generation), Some(21));

    uni.reset();
    assert!(uni.population_history().is_empty());
  }

  #[test]
  fn randomize_is_deterministic_for_a_seed() {
    let mut a = Universe::new(20, 20);
    let mut b = Universe::new(20, 20);
    a.randomize(&mut StdRng::seed_from_u64(42));
    b.randomize(&mut StdRng::seed_from_u64(42));
    assert_eq!(a.grid(), b.grid());
    assert!(a.live_cells() > 0 && a.live_cells() < 400);
  }

  #[test]
  fn bad_notation_keeps_ruleset() {
    let mut uni = Universe::new(3, 3);
    assert!(uni.set_notation("B36S23").is_ok());
    assert_eq!(uni.ruleset().name, "HighLife");
    assert!(uni.set_notation("nonsense").is_err());
    assert_eq!(uni.ruleset().name, "HighLife");

    let mut broken = Ruleset::default();
    broken.notation = "B36/S23".into();
    assert!(uni.set_ruleset(broken).is_err());
    assert_eq!(uni.ruleset().notation, "B36/S23");
    assert_eq!(uni.ruleset().name, "HighLife");
  }

  #[test]
  fn statistics() {
    let mut uni = Universe::new(8, 8);
    assert_eq!(uni.growth_rate(), None);
    uni.stamp(pattern::find("Blinker").unwrap(), 2, 1);
    assert_eq!(uni.population_density(), 4.6875);
    uni.step();
    assert_eq!(uni.growth_rate(), Some(0));

    // isolated cell, dies on the next step
    uni.toggle(6, 6).unwrap();
    uni.step();
    assert_eq!(uni.live_cells(), 3);
    assert_eq!(uni.growth_rate(), Some(-1));
  }

  #[test]
  fn bad_share_token_leaves_state() {
    let mut uni = Universe::new(4, 4);
    uni.toggle(0, 0).unwrap();
    uni.step();
    let before = uni.grid().clone();
    assert!(uni.load_share_token("%%%").is_err());
    assert_eq!(uni.grid(), &before);
    assert_eq!(uni.generation(), 1);
  }

  #[test]
  fn share_token_restores_state() {
    let mut uni = Universe::new(7, 5);
    uni.stamp_centered(pattern::find("Toad").unwrap());
    uni.simulate(3);
    let token = uni.share_token();

    let mut other = Universe::new(2, 2);
    other.load_share_token(&token).unwrap();
    assert_eq!(other.grid(), uni.grid());
    assert_eq!(other.generation(), 3);
    assert!(!other.can_step_back());
  }
}
