use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::grid::{self, GridError};
use crate::history::{HISTORY_CAPACITY, MAX_HISTORY_CAPACITY};
use crate::neighbor::BoundaryMode;
use crate::rule::{self, RuleError, Ruleset};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),
  #[error("invalid rule in config: {0}")]
  Rule(#[from] RuleError),
  #[error("random density {0} is outside 0..=1")]
  Density(f64),
  #[error("invalid grid size in config: {0}")]
  GridSize(#[from] GridError),
  #[error("history capacity {0} exceeds {}", MAX_HISTORY_CAPACITY)]
  HistoryCapacity(usize),
}

/// Settings a [`Universe`](crate::universe::Universe) starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  pub width: usize,
  pub height: usize,
  pub boundary: BoundaryMode,
  /// B/S notation
  pub rule: String,
  pub history_capacity: usize,
  /// Probability that `randomize` makes a cell alive.
  pub random_density: f64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      width: 40,
      height: 40,
      boundary: BoundaryMode::Toroidal,
      rule: "B3/S23".to_owned(),
      history_capacity: HISTORY_CAPACITY,
      random_density: 0.3,
    }
  }
}

impl EngineConfig {
  pub fn from_json(src: &str) -> Result<Self, ConfigError> {
    let config: Self = serde_json::from_str(src)?;
    config.validate()?;
    Ok(config)
  }

  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_owned(),
      source,
    })?;
    Self::from_json(&src)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    self.ruleset()?;
    grid::cell_count(self.width, self.height)?;
    if self.history_capacity > MAX_HISTORY_CAPACITY {
      return Err(ConfigError::HistoryCapacity(self.history_capacity));
    }
    if !(0.0..=1.0).contains(&self.random_density) {
      return Err(ConfigError::Density(self.random_density));
    }
    Ok(())
  }

  pub fn ruleset(&self) -> Result<Ruleset, ConfigError> {
    Ok(rule::parse(&self.rule)?)
  }

  pub fn with_preset(mut self, preset: &GridPreset) -> Self {
    self.width = preset.width;
    self.height = preset.height;
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPreset {
  pub name: &'static str,
  pub width: usize,
  pub height: usize,
}

pub const GRID_PRESETS: &[GridPreset] = &[
  GridPreset { name: "Small", width: 20, height: 20 },
  GridPreset { name: "Medium", width: 40, height: 40 },
  GridPreset { name: "Large", width: 60, height: 60 },
  GridPreset { name: "Extra Large", width: 80, height: 80 },
  GridPreset { name: "Landscape", width: 60, height: 30 },
  GridPreset { name: "Portrait", width: 30, height: 60 },
];

pub fn preset(name: &str) -> Option<&'static GridPreset> {
  GRID_PRESETS.iter().find(|p| p.name == name)
}
