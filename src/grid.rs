use std::convert::TryFrom;
use std::fmt::{self, Display};
use std::ops::Index;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
  #[error("row {row} has {found} cells, expected {expected}")]
  Ragged {
    row: usize,
    expected: usize,
    found: usize,
  },
  #[error("cell ({row}, {col}) is outside a {width}x{height} grid")]
  OutOfBounds {
    row: usize,
    col: usize,
    width: usize,
    height: usize,
  },
  #[error("invalid cell character {0:?}")]
  InvalidCell(char),
  #[error("a {width}x{height} grid exceeds {} cells", MAX_CELLS)]
  TooLarge { width: usize, height: usize },
}

/// Largest number of cells a grid built from outside input may hold.
pub const MAX_CELLS: usize = 1 << 24;

/// `width * height`, or [`GridError::TooLarge`] when it overflows or
/// exceeds [`MAX_CELLS`].
pub fn cell_count(width: usize, height: usize) -> Result<usize, GridError> {
  width
    .checked_mul(height)
    .filter(|&total| total <= MAX_CELLS)
    .ok_or(GridError::TooLarge { width, height })
}

/// A `width` x `height` rectangle of cells stored in row-major order.
///
/// Serialized as rows of rows, so a grid with zero rows loses its width.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(
  try_from = "Vec<Vec<T>>",
  into = "Vec<Vec<T>>",
  bound(serialize = "T: Clone + Serialize", deserialize = "T: Deserialize<'de>")
)]
pub struct Grid<T = bool> {
  width: usize,
  height: usize,
  cells: Vec<T>,
}

/// Liveness of every cell.
pub type CellGrid = Grid<bool>;

/// Number of consecutive generations each cell has been alive.
pub type AgeGrid = Grid<u32>;

impl<T: Clone + Default> Grid<T> {
  /// # Panics
  ///
  /// If `width * height` overflows `usize`. Use [`Grid::try_new`] for
  /// dimensions that come from outside input.
  pub fn new(width: usize, height: usize) -> Self {
    let total = width
      .checked_mul(height)
      .unwrap_or_else(|| panic!("{}x{} grid overflows usize", width, height));
    Self {
      width,
      height,
      cells: vec![T::default(); total],
    }
  }

  /// Like [`Grid::new`], but rejects grids larger than [`MAX_CELLS`].
  pub fn try_new(width: usize, height: usize) -> Result<Self, GridError> {
    let total = cell_count(width, height)?;
    Ok(Self {
      width,
      height,
      cells: vec![T::default(); total],
    })
  }
}

impl<T> Grid<T> {
  pub fn from_fn(
    width: usize,
    height: usize,
    mut f: impl FnMut(usize, usize) -> T,
  ) -> Self {
    let total = width
      .checked_mul(height)
      .unwrap_or_else(|| panic!("{}x{} grid overflows usize", width, height));
    let mut cells = Vec::with_capacity(total);
    for row in 0..height {
      for col in 0..width {
        cells.push(f(row, col));
      }
    }
    Self { width, height, cells }
  }

  /// Build a grid from rows, rejecting rows whose length differs from the
  /// first one.
  pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, GridError> {
    let height = rows.len();
    let width = rows.first().map_or(0, Vec::len);
    let mut cells = Vec::with_capacity(width * height);
    for (row, data) in rows.into_iter().enumerate() {
      if data.len() != width {
        return Err(GridError::Ragged {
          row,
          expected: width,
          found: data.len(),
        });
      }
      cells.extend(data);
    }
    Ok(Self { width, height, cells })
  }

  /// `cells.len()` must equal `width * height`.
  pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<T>) -> Self {
    debug_assert_eq!(cells.len(), width * height);
    Self { width, height, cells }
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
    self.width == other.width && self.height == other.height
  }

  pub fn contains(&self, row: usize, col: usize) -> bool {
    row < self.height && col < self.width
  }

  pub fn get(&self, row: usize, col: usize) -> Option<&T> {
    if self.contains(row, col) {
      self.cells.get(row * self.width + col)
    } else {
      None
    }
  }

  pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<(), GridError> {
    let i = self.offset(row, col)?;
    self.cells[i] = value;
    Ok(())
  }

  /// Cells in row-major order.
  pub fn cells(&self) -> &[T] {
    &self.cells
  }

  pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
    let width = self.width;
    (0..self.height).map(move |row| &self.cells[row * width..(row + 1) * width])
  }

  pub fn to_rows(&self) -> Vec<Vec<T>>
  where
    T: Clone,
  {
    self.rows().map(<[T]>::to_vec).collect()
  }

  fn offset(&self, row: usize, col: usize) -> Result<usize, GridError> {
    if self.contains(row, col) {
      Ok(row * self.width + col)
    } else {
      Err(GridError::OutOfBounds {
        row,
        col,
        width: self.width,
        height: self.height,
      })
    }
  }
}

impl Grid<bool> {
  /// Flip a cell and return its new state.
  pub fn toggle(&mut self, row: usize, col: usize) -> Result<bool, GridError> {
    let i = self.offset(row, col)?;
    self.cells[i] = !self.cells[i];
    Ok(self.cells[i])
  }

  pub fn is_alive(&self, row: usize, col: usize) -> bool {
    self.get(row, col).copied().unwrap_or(false)
  }

  pub fn live_count(&self) -> usize {
    self.cells.iter().filter(|&&alive| alive).count()
  }

  /// Percentage of live cells, 0 for an empty grid.
  pub fn density(&self) -> f64 {
    if self.cells.is_empty() {
      0.0
    } else {
      self.live_count() as f64 * 100.0 / self.cells.len() as f64
    }
  }
}

impl<T> Index<(usize, usize)> for Grid<T> {
  type Output = T;

  fn index(&self, (row, col): (usize, usize)) -> &T {
    assert!(self.contains(row, col), "({}, {}) out of bounds", row, col);
    &self.cells[row * self.width + col]
  }
}

impl<T> TryFrom<Vec<Vec<T>>> for Grid<T> {
  type Error = GridError;

  fn try_from(rows: Vec<Vec<T>>) -> Result<Self, GridError> {
    Self::from_rows(rows)
  }
}

impl<T: Clone> From<Grid<T>> for Vec<Vec<T>> {
  fn from(grid: Grid<T>) -> Self {
    grid.to_rows()
  }
}

/// `#` for a live cell, `.` for a dead one, one line per row.
impl Display for Grid<bool> {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    for (i, row) in self.rows().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      for &alive in row {
        write!(f, "{}", if alive { '#' } else { '.' })?;
      }
    }
    Ok(())
  }
}

impl FromStr for Grid<bool> {
  type Err = GridError;

  fn from_str(s: &str) -> Result<Self, GridError> {
    let rows = s
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(|line| {
        line
          .chars()
          .map(|c| match c {
            '#' | 'O' | 'o' => Ok(true),
            '.' | '_' => Ok(false),
            c => Err(GridError::InvalidCell(c)),
          })
          .collect::<Result<Vec<_>, _>>()
      })
      .collect::<Result<Vec<_>, _>>()?;
    Self::from_rows(rows)
  }
}
