//! Named snapshots of a grid, kept in a string key-value store.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use crate::grid::CellGrid;

pub const STORAGE_PREFIX: &str = "game-of-life-state-";

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to serialize {name:?}: {source}")]
  Serialize {
    name: String,
    #[source]
    source: serde_json::Error,
  },
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SavedGrid {
  pub name: String,
  pub grid: CellGrid,
  pub generation: u64,
  /// milliseconds since the Unix epoch
  pub timestamp: u64,
}

pub trait GridStore {
  fn save(&mut self, name: &str, grid: &CellGrid, generation: u64) -> Result<(), StoreError>;

  /// `None` when nothing usable is stored under `name`.
  fn load(&self, name: &str) -> Option<SavedGrid>;

  /// Every readable entry, newest first.
  fn list(&self) -> Vec<SavedGrid>;

  fn delete(&mut self, name: &str);
}

pub trait Clock {
  fn now_millis(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_millis(&self) -> u64 {
    SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|d| d.as_millis() as u64)
      .unwrap_or(0)
  }
}

/// In-memory [`GridStore`] holding JSON documents under prefixed keys,
/// the way a browser's local storage would.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore<C = SystemClock> {
  entries: BTreeMap<String, String>,
  clock: C,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl<C: Clock> MemoryStore<C> {
  pub fn with_clock(clock: C) -> Self {
    Self {
      entries: BTreeMap::new(),
      clock,
    }
  }

  /// Store a raw document under `key`, bypassing validation.
  pub fn insert_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.entries.insert(key.into(), value.into());
  }
}

impl<C: Clock> GridStore for MemoryStore<C> {
  fn save(&mut self, name: &str, grid: &CellGrid, generation: u64) -> Result<(), StoreError> {
    let saved = SavedGrid {
      name: name.to_owned(),
      grid: grid.clone(),
      generation,
      timestamp: self.clock.now_millis(),
    };
    let doc = serde_json::to_string(&saved).map_err(|source| StoreError::Serialize {
      name: name.to_owned(),
      source,
    })?;
    self.entries.insert(format!("{}{}", STORAGE_PREFIX, name), doc);
    debug!(name, generation, "saved grid");
    Ok(())
  }

  fn load(&self, name: &str) -> Option<SavedGrid> {
    let doc = self.entries.get(&format!("{}{}", STORAGE_PREFIX, name))?;
    let mut saved = parse_saved(doc)?;
    saved.name = name.to_owned();
    Some(saved)
  }

  fn list(&self) -> Vec<SavedGrid> {
    let mut saved: Vec<_> = self
      .entries
      .keys()
      .filter_map(|key| key.strip_prefix(STORAGE_PREFIX))
      .filter_map(|name| self.load(name))
      .collect();
    saved.sort_by(|a, b| {
      b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| b.name.cmp(&a.name))
    });
    saved
  }

  fn delete(&mut self, name: &str) {
    if self.entries.remove(&format!("{}{}", STORAGE_PREFIX, name)).is_some() {
      debug!(name, "deleted saved grid");
    }
  }
}

/// Lenient form of [`SavedGrid`]: counters may be numeric strings or
/// fractional, and default to 0 when unusable.
#[derive(Deserialize)]
struct RawSaved {
  name: String,
  grid: CellGrid,
  #[serde(default)]
  generation: Value,
  #[serde(default)]
  timestamp: Value,
}

fn parse_saved(doc: &str) -> Option<SavedGrid> {
  let raw: RawSaved = serde_json::from_str(doc).ok()?;
  if raw.name.is_empty() {
    return None;
  }
  Some(SavedGrid {
    name: raw.name,
    grid: raw.grid,
    generation: coerce_count(&raw.generation),
    timestamp: coerce_count(&raw.timestamp),
  })
}

fn coerce_count(value: &Value) -> u64 {
  let n = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  match n {
    Some(n) if n.is_finite() && n > 0.0 => n.floor() as u64,
    _ => 0,
  }
}
