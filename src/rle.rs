use std::sync::OnceLock;
use itertools::Itertools;
use regex::Regex;
use thiserror::Error;
use crate::grid::CellGrid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RleError {
  #[error("missing `x = <width>, y = <height>` header line")]
  MissingHeader,
  #[error("pattern body is not terminated by `!`")]
  MissingTerminator,
  #[error("unexpected character {0:?} in pattern body")]
  UnexpectedChar(char),
  #[error("run count overflows")]
  CountOverflow,
  #[error("a {width}x{height} pattern is too large")]
  TooLarge { width: usize, height: usize },
  #[error("cell ({row}, {col}) lies outside the declared {width}x{height} pattern")]
  OutOfBounds {
    row: usize,
    col: usize,
    width: usize,
    height: usize,
  },
}

/// A pattern read from RLE text.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PatternFile {
  pub name: Option<String>,
  pub rule: Option<String>,
  pub grid: CellGrid,
}

/// Read a Life pattern from a RLE string.
///
/// RLE format: <https://www.conwaylife.com/wiki/Run_Length_Encoded>.
pub fn read(src: impl AsRef<str>) -> Result<PatternFile, RleError> {
  static HEADER: OnceLock<Regex> = OnceLock::new();
  let header_re = HEADER.get_or_init(|| {
    Regex::new(r"^x\s*=\s*(\d+)\s*,\s*y\s*=\s*(\d+)\s*(?:,\s*rule\s*=\s*(\S+))?\s*$")
      .expect("header regex")
  });

  let mut name = None;
  let mut lines = src.as_ref().lines().map(str::trim);
  let caps = loop {
    let line = lines.next().ok_or(RleError::MissingHeader)?;
    if let Some(rest) = line.strip_prefix("#N") {
      name = Some(rest.trim().to_owned());
    } else if line.is_empty() || line.starts_with('#') {
      continue;
    } else {
      break header_re.captures(line).ok_or(RleError::MissingHeader)?;
    }
  };
  let width: usize = caps[1].parse().map_err(|_| RleError::CountOverflow)?;
  let height: usize = caps[2].parse().map_err(|_| RleError::CountOverflow)?;
  let rule = caps.get(3).map(|m| m.as_str().to_owned());

  let mut grid =
    CellGrid::try_new(width, height).map_err(|_| RleError::TooLarge { width, height })?;
  let mut x: usize = 0;
  let mut y: usize = 0;
  let mut num: Option<usize> = None;
  for c in lines.flat_map(str::chars) {
    match c {
      '0'..='9' => {
        let digit = c as usize - '0' as usize;
        let n = num.unwrap_or(0)
          .checked_mul(10)
          .and_then(|n| n.checked_add(digit))
          .ok_or(RleError::CountOverflow)?;
        num = Some(n);
      }
      'b' | 'o' => {
        let n = num.take().unwrap_or(1);
        let end = x.saturating_add(n);
        if n > 0 && (y >= height || end > width) {
          return Err(RleError::OutOfBounds {
            row: y,
            col: end - 1,
            width,
            height,
          });
        }
        if c == 'o' {
          for i in 0..n {
            // bounds checked above
            let _ = grid.set(y, x + i, true);
          }
        }
        x += n;
      }
      '$' => {
        y = y.saturating_add(num.take().unwrap_or(1));
        x = 0;
      }
      '!' => {
        return Ok(PatternFile { name, rule, grid });
      }
      c if c.is_whitespace() => {}
      c => {
        return Err(RleError::UnexpectedChar(c));
      }
    }
  }

  Err(RleError::MissingTerminator)
}

/// Write a grid as a named RLE pattern: a `#N` line, the `x = .., y = ..`
/// header and one line of runs, rows separated by `$` and closed by `!`.
/// Every row is written in full, trailing dead cells included.
pub fn write(grid: &CellGrid, name: &str) -> String {
  let mut output = format!("#N {}\nx = {}, y = {}\n", name, grid.width(), grid.height());

  for (i, row) in grid.rows().enumerate() {
    if i > 0 {
      RleUnit::NextRow.write(1, &mut output);
    }
    for (alive, run) in &row.iter().group_by(|&&alive| alive) {
      let unit = if alive { RleUnit::Alive } else { RleUnit::Dead };
      unit.write(run.count(), &mut output);
    }
  }

  output.push('!');
  output
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RleUnit {
  Dead,
  Alive,
  NextRow,
}

impl RleUnit {
  fn write(&self, num: usize, s: &mut String) {
    let c = match self {
      Self::Dead => 'b',
      Self::Alive => 'o',
      Self::NextRow => '$',
    };

    if num != 1 {
      s.push_str(&num.to_string());
    }
    s.push(c);
  }
}
