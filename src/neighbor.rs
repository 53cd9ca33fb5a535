use serde::{Deserialize, Serialize};
use crate::grid::CellGrid;

/// How the edges of the grid behave.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
  /// Opposite edges are adjacent.
  Toroidal,
  /// Cells past the edge do not exist.
  Finite,
}

impl BoundaryMode {
  pub fn toggled(self) -> Self {
    match self {
      Self::Toroidal => Self::Finite,
      Self::Finite => Self::Toroidal,
    }
  }
}

impl Default for BoundaryMode {
  fn default() -> Self {
    Self::Toroidal
  }
}

const MOORE: [(isize, isize); 8] = [
  (-1, -1), (-1, 0), (-1, 1),
  (0, -1), (0, 1),
  (1, -1), (1, 0), (1, 1),
];

/// Number of live cells in the Moore neighborhood of `(row, col)`.
pub fn count(grid: &CellGrid, row: usize, col: usize, boundary: BoundaryMode) -> u8 {
  let height = grid.height() as isize;
  let width = grid.width() as isize;
  if height == 0 || width == 0 {
    return 0;
  }

  let mut live = 0;
  for &(dr, dc) in MOORE.iter() {
    let r = row as isize + dr;
    let c = col as isize + dc;
    let (r, c) = match boundary {
      BoundaryMode::Finite => {
        if r < 0 || r >= height || c < 0 || c >= width {
          continue;
        }
        (r, c)
      }
      BoundaryMode::Toroidal => (r.rem_euclid(height), c.rem_euclid(width)),
    };
    if grid.is_alive(r as usize, c as usize) {
      live += 1;
    }
  }
  live
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toroidal_wraps_diagonally() {
    let mut grid = CellGrid::new(3, 3);
    grid.set(2, 2, true).unwrap();
    assert_eq!(count(&grid, 0, 0, BoundaryMode::Toroidal), 1);
    assert_eq!(count(&grid, 0, 0, BoundaryMode::Finite), 0);
  }

  #[test]
  fn finite_corner_sees_three_cells() {
    let grid = CellGrid::from_fn(4, 4, |_, _| true);
    assert_eq!(count(&grid, 0, 0, BoundaryMode::Finite), 3);
    assert_eq!(count(&grid, 0, 1, BoundaryMode::Finite), 5);
    assert_eq!(count(&grid, 1, 1, BoundaryMode::Finite), 8);
    assert_eq!(count(&grid, 3, 3, BoundaryMode::Toroidal), 8);
  }

  #[test]
  fn self_is_not_counted() {
    let mut grid = CellGrid::new(5, 5);
    grid.set(2, 2, true).unwrap();
    assert_eq!(count(&grid, 2, 2, BoundaryMode::Finite), 0);
    assert_eq!(count(&grid, 1, 1, BoundaryMode::Finite), 1);
  }

  #[test]
  fn tiny_torus_counts_wrapped_duplicates() {
    // On a 1x1 torus every neighbor offset lands on the cell itself.
    let grid = CellGrid::from_fn(1, 1, |_, _| true);
    assert_eq!(count(&grid, 0, 0, BoundaryMode::Toroidal), 8);
    assert_eq!(count(&grid, 0, 0, BoundaryMode::Finite), 0);
  }
}
