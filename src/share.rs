//! Compact share-link tokens.
//!
//! A token is the base64url (no padding) encoding of a small JSON record
//! `{"w":width,"h":height,"g":generation,"d":runs}`. `runs` is the row-major
//! run-length encoding of the grid, each run written as
//! `<'0'|'1'><count in base 36>|`, e.g. ten live cells followed by fifteen
//! dead ones is `1a|0f|`.
//!
//! Malformed tokens are ordinary user input: [`decode`] reports them as an
//! `Err` and never logs.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::grid::{self, CellGrid};

/// Largest grid a token may describe.
pub use crate::grid::MAX_CELLS;

#[derive(Debug, Error)]
pub enum ShareError {
  #[error("token contains characters outside the base64url alphabet")]
  Alphabet,
  #[error("token is not valid base64url: {0}")]
  Base64(#[from] base64::DecodeError),
  #[error("token payload is not a valid state record: {0}")]
  Json(#[from] serde_json::Error),
  #[error("grid of {width}x{height} cells is too large")]
  TooLarge { width: usize, height: usize },
  #[error("malformed run {0:?}")]
  InvalidRun(String),
  #[error("runs describe more than {expected} cells")]
  Overflow { expected: usize },
  #[error("runs describe {found} cells, expected {expected}")]
  CellCount { expected: usize, found: usize },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EncodedState {
  pub width: usize,
  pub height: usize,
  pub generation: u64,
  pub grid: CellGrid,
}

#[derive(Serialize, Deserialize)]
struct Payload {
  w: usize,
  h: usize,
  #[serde(default)]
  g: u64,
  #[serde(default)]
  d: String,
}

pub fn encode(grid: &CellGrid, generation: u64) -> String {
  let mut runs = String::new();
  for (alive, run) in &grid.cells().iter().group_by(|&&alive| alive) {
    runs.push(if alive { '1' } else { '0' });
    runs.push_str(&to_base36(run.count()));
    runs.push('|');
  }

  let payload = Payload {
    w: grid.width(),
    h: grid.height(),
    g: generation,
    d: runs,
  };
  // a struct of integers and a string always serializes
  let json = serde_json::to_vec(&payload).unwrap_or_default();
  URL_SAFE_NO_PAD.encode(json)
}

pub fn decode(token: &str) -> Result<EncodedState, ShareError> {
  if !token.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
    return Err(ShareError::Alphabet);
  }
  let json = URL_SAFE_NO_PAD.decode(token)?;
  let Payload { w, h, g, d } = serde_json::from_slice(&json)?;

  let total =
    grid::cell_count(w, h).map_err(|_| ShareError::TooLarge { width: w, height: h })?;

  let mut cells = Vec::with_capacity(total);
  for run in d.split('|').filter(|run| !run.is_empty()) {
    let (alive, count) = parse_run(run)?;
    if count > total - cells.len() {
      return Err(ShareError::Overflow { expected: total });
    }
    cells.extend(std::iter::repeat(alive).take(count));
  }
  if cells.len() != total {
    return Err(ShareError::CellCount {
      expected: total,
      found: cells.len(),
    });
  }

  Ok(EncodedState {
    width: w,
    height: h,
    generation: g,
    grid: CellGrid::from_cells(w, h, cells),
  })
}

fn parse_run(run: &str) -> Result<(bool, usize), ShareError> {
  let invalid = || ShareError::InvalidRun(run.to_owned());
  let alive = match run.as_bytes()[0] {
    b'0' => false,
    b'1' => true,
    _ => return Err(invalid()),
  };
  let digits = &run[1..];
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
    return Err(invalid());
  }
  match usize::from_str_radix(digits, 36) {
    Ok(count) if count > 0 => Ok((alive, count)),
    _ => Err(invalid()),
  }
}

fn to_base36(mut n: usize) -> String {
  const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
  let mut buf = vec![];
  loop {
    buf.push(DIGITS[n % 36]);
    n /= 36;
    if n == 0 {
      break;
    }
  }
  buf.reverse();
  buf.into_iter().map(char::from).collect()
}
