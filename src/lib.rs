//! A two-dimensional life-like cellular automaton: birth/survival rules,
//! toroidal or finite boundaries, per-cell ages, bounded step-back history,
//! RLE pattern files and compact share-link tokens.

use thiserror::Error;

pub mod config;
pub mod export;
pub mod grid;
pub mod history;
pub mod neighbor;
pub mod pattern;
pub mod rle;
pub mod rule;
pub mod share;
pub mod store;
pub mod universe;

pub use config::{ConfigError, EngineConfig};
pub use grid::{AgeGrid, CellGrid, Grid, GridError};
pub use history::{HistoryBuffer, HistoryEntry, HISTORY_CAPACITY};
pub use neighbor::BoundaryMode;
pub use pattern::{Pattern, PatternKind};
pub use rle::{PatternFile, RleError};
pub use rule::{Rule, RuleError, Ruleset, GAME_OF_LIFE, RULESETS};
pub use share::{EncodedState, ShareError};
pub use store::{GridStore, MemoryStore, SavedGrid, StoreError};
pub use universe::{PopulationSample, Universe};

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Config(#[from] ConfigError),
  #[error(transparent)]
  Grid(#[from] GridError),
  #[error(transparent)]
  Rule(#[from] RuleError),
  #[error(transparent)]
  Share(#[from] ShareError),
  #[error(transparent)]
  Rle(#[from] RleError),
  #[error(transparent)]
  Store(#[from] StoreError),
  #[error(transparent)]
  Export(#[from] export::ExportError),
}

pub type Result<T> = std::result::Result<T, Error>;
