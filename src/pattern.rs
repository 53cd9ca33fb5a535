use std::borrow::Cow;
use std::hash::BuildHasherDefault;
use std::sync::OnceLock;
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use crate::grid::CellGrid;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
  StillLife,
  Oscillator,
  Spaceship,
  Gun,
  Methuselah,
  Replicator,
  Other,
}

/// Live cells as `(row, col)` offsets from the placement point.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Pattern {
  pub name: Cow<'static, str>,
  pub description: Cow<'static, str>,
  pub cells: Cow<'static, [(i64, i64)]>,
  pub kind: PatternKind,
  /// Notation of the rule the pattern was designed for, if not Life.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ruleset: Option<Cow<'static, str>>,
}

/// Inclusive bounding box of a pattern's cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Bounds {
  pub min_row: i64,
  pub max_row: i64,
  pub min_col: i64,
  pub max_col: i64,
}

impl Bounds {
  pub fn height(&self) -> i64 {
    self.max_row - self.min_row + 1
  }

  pub fn width(&self) -> i64 {
    self.max_col - self.min_col + 1
  }
}

impl Pattern {
  /// `None` for a pattern without cells.
  pub fn bounds(&self) -> Option<Bounds> {
    let (&(r0, c0), rest) = self.cells.split_first()?;
    let mut b = Bounds {
      min_row: r0,
      max_row: r0,
      min_col: c0,
      max_col: c0,
    };
    for &(r, c) in rest {
      b.min_row = b.min_row.min(r);
      b.max_row = b.max_row.max(r);
      b.min_col = b.min_col.min(c);
      b.max_col = b.max_col.max(c);
    }
    Some(b)
  }
}

/// Return a copy of `grid` with every pattern cell turned on. Placement
/// wraps around the grid edges and never turns a cell off.
pub fn stamp(grid: &CellGrid, pattern: &Pattern, start_row: i64, start_col: i64) -> CellGrid {
  let mut out = grid.clone();
  stamp_into(&mut out, pattern, start_row, start_col);
  out
}

pub(crate) fn stamp_into(grid: &mut CellGrid, pattern: &Pattern, start_row: i64, start_col: i64) {
  let height = grid.height() as i64;
  let width = grid.width() as i64;
  if height == 0 || width == 0 {
    return;
  }

  for &(dr, dc) in pattern.cells.iter() {
    let row = start_row.wrapping_add(dr).rem_euclid(height) as usize;
    let col = start_col.wrapping_add(dc).rem_euclid(width) as usize;
    // in range after wrapping
    let _ = grid.set(row, col, true);
  }
}

/// Placement that centers the pattern's bounding box in a
/// `width` x `height` grid.
pub fn centered_origin(width: usize, height: usize, pattern: &Pattern) -> Option<(i64, i64)> {
  let b = pattern.bounds()?;
  let row = (height as i64 - b.height()).div_euclid(2) - b.min_row;
  let col = (width as i64 - b.width()).div_euclid(2) - b.min_col;
  Some((row, col))
}

pub type PatternLibrary = IndexMap<&'static str, Pattern, BuildHasherDefault<FxHasher>>;

/// Built-in patterns keyed by name, in display order.
pub fn library() -> &'static PatternLibrary {
  static LIBRARY: OnceLock<PatternLibrary> = OnceLock::new();
  LIBRARY.get_or_init(|| {
    BUILTIN
      .iter()
      .map(|&(name, description, kind, ruleset, cells)| {
        let pattern = Pattern {
          name: Cow::Borrowed(name),
          description: Cow::Borrowed(description),
          cells: Cow::Borrowed(cells),
          kind,
          ruleset: ruleset.map(Cow::Borrowed),
        };
        (name, pattern)
      })
      .collect()
  })
}

pub fn find(name: &str) -> Option<&'static Pattern> {
  library().get(name)
}

type Builtin = (
  &'static str,
  &'static str,
  PatternKind,
  Option<&'static str>,
  &'static [(i64, i64)],
);

const BUILTIN: &[Builtin] = &[
  ("Block", "The smallest still life", PatternKind::StillLife, None,
    &[(0, 0), (0, 1), (1, 0), (1, 1)]),
  ("Beehive", "A common six-cell still life", PatternKind::StillLife, None,
    &[(0, 1), (0, 2), (1, 0), (1, 3), (2, 1), (2, 2)]),
  ("Blinker", "Period 2 oscillator, three cells in a row", PatternKind::Oscillator, None,
    &[(0, 0), (0, 1), (0, 2)]),
  ("Toad", "Period 2 oscillator", PatternKind::Oscillator, None,
    &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)]),
  ("Beacon", "Period 2 oscillator made of two blocks", PatternKind::Oscillator, None,
    &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)]),
  ("Glider", "The smallest spaceship, moves diagonally", PatternKind::Spaceship, None,
    &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]),
  ("Lightweight Spaceship", "Orthogonal spaceship, period 4", PatternKind::Spaceship, None,
    &[(0, 1), (0, 4), (1, 0), (2, 0), (2, 4), (3, 0), (3, 1), (3, 2), (3, 3)]),
  ("R-pentomino", "Five cells that stabilize after 1103 generations", PatternKind::Methuselah, None,
    &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)]),
  ("Diehard", "Vanishes after 130 generations", PatternKind::Methuselah, None,
    &[(0, 6), (1, 0), (1, 1), (2, 1), (2, 5), (2, 6), (2, 7)]),
  ("Acorn", "Grows for 5206 generations", PatternKind::Methuselah, None,
    &[(0, 1), (1, 3), (2, 0), (2, 1), (2, 4), (2, 5), (2, 6)]),
  ("Gosper Glider Gun", "Emits a glider every 30 generations", PatternKind::Gun, None,
    &[
      (0, 24),
      (1, 22), (1, 24),
      (2, 12), (2, 13), (2, 20), (2, 21), (2, 34), (2, 35),
      (3, 11), (3, 15), (3, 20), (3, 21), (3, 34), (3, 35),
      (4, 0), (4, 1), (4, 10), (4, 16), (4, 20), (4, 21),
      (5, 0), (5, 1), (5, 10), (5, 14), (5, 16), (5, 17), (5, 22), (5, 24),
      (6, 10), (6, 16), (6, 24),
      (7, 11), (7, 15),
      (8, 12), (8, 13),
    ]),
  ("Replicator", "HighLife pattern that copies itself", PatternKind::Replicator, Some("B36/S23"),
    &[(0, 2), (0, 3), (0, 4), (1, 1), (1, 4), (2, 0), (2, 4), (3, 0), (3, 3), (4, 0), (4, 1), (4, 2)]),
  ("Diamond", "Day & Night diamond", PatternKind::Other, Some("B3678/S34678"),
    &[(0, 2), (1, 1), (1, 2), (1, 3), (2, 0), (2, 1), (2, 2), (2, 3), (2, 4), (3, 1), (3, 2), (3, 3), (4, 2)]),
  ("Two Seeds", "Two cells that explode under Seeds", PatternKind::Other, Some("B2/S"),
    &[(0, 0), (0, 1)]),
  ("Maze Seed", "A plus sign that grows into a maze", PatternKind::Other, Some("B3/S12345"),
    &[(0, 1), (1, 0), (1, 1), (1, 2), (2, 1)]),
];
