use std::borrow::Cow;
use std::convert::TryFrom;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::OnceLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
  #[error("malformed rule notation {0:?}, expected B<digits>/S<digits>")]
  Malformed(String),
  #[error("neighbor count {0} is outside 0..=8")]
  NeighborCount(u32),
  #[error("notation {notation:?} does not match its birth/survival sets ({expected})")]
  Inconsistent {
    notation: String,
    expected: String,
  },
}

/// Compiled birth/survival conditions. Bit `n` of a mask is set when a cell
/// with `n` live neighbors is born (or survives).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rule {
  birth: NeighborMask,
  survival: NeighborMask,
}

pub(crate) type NeighborMask = u16;

pub const GAME_OF_LIFE: Rule = Rule {
  birth: 0b000001000,
  survival: 0b000001100,
};

impl Rule {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_birth(&mut self, num: u8) -> Result<(), RuleError> {
    self.birth |= neighbor_bit(num)?;
    Ok(())
  }

  pub fn set_survival(&mut self, num: u8) -> Result<(), RuleError> {
    self.survival |= neighbor_bit(num)?;
    Ok(())
  }

  pub fn births(&self) -> Vec<u8> {
    mask_counts(self.birth)
  }

  pub fn survivals(&self) -> Vec<u8> {
    mask_counts(self.survival)
  }

  /// Whether a cell is alive in the next generation.
  #[inline]
  pub fn apply(&self, alive: bool, live_neighbors: u8) -> bool {
    let mask = if alive { self.survival } else { self.birth };
    live_neighbors < 9 && mask >> live_neighbors & 1 != 0
  }
}

fn neighbor_bit(num: u8) -> Result<NeighborMask, RuleError> {
  if num < 9 {
    Ok(1 << num)
  } else {
    Err(RuleError::NeighborCount(num.into()))
  }
}

fn mask_counts(mut mask: NeighborMask) -> Vec<u8> {
  let mut counts = vec![];
  while mask != 0 {
    counts.push(mask.trailing_zeros() as u8);
    mask &= mask - 1;
  }
  counts
}

impl Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "B")?;
    let mut b = self.birth;
    while b != 0 {
      write!(f, "{}", b.trailing_zeros())?;
      b &= b - 1;
    }
    write!(f, "/S")?;
    let mut s = self.survival;
    while s != 0 {
      write!(f, "{}", s.trailing_zeros())?;
      s &= s - 1;
    }
    Ok(())
  }
}

impl FromStr for Rule {
  type Err = RuleError;

  /// Accepts `B3/S23`, `b3/s23`, `B3S23` and empty digit runs such as `B2/S`.
  fn from_str(notation: &str) -> Result<Self, RuleError> {
    static NOTATION: OnceLock<Regex> = OnceLock::new();
    let re = NOTATION
      .get_or_init(|| Regex::new(r"^[Bb]([0-9]*)/?[Ss]([0-9]*)$").expect("notation regex"));
    let caps = re
      .captures(notation.trim())
      .ok_or_else(|| RuleError::Malformed(notation.to_owned()))?;

    let mut rule = Rule::new();
    for c in caps[1].bytes() {
      rule.set_birth(c - b'0')?;
    }
    for c in caps[2].bytes() {
      rule.set_survival(c - b'0')?;
    }
    Ok(rule)
  }
}

/// A named automaton rule in the shape it is exchanged with hosts and
/// stores. `notation` must be the canonical rendering of `birth` and
/// `survival`; see [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
  pub name: Cow<'static, str>,
  pub description: Cow<'static, str>,
  pub birth: Cow<'static, [u8]>,
  pub survival: Cow<'static, [u8]>,
  pub notation: Cow<'static, str>,
}

impl Ruleset {
  /// The preset with the same notation, or a ruleset named "Custom".
  pub fn from_rule(rule: Rule) -> Self {
    let notation = rule.to_string();
    if let Some(preset) = by_notation(&notation) {
      return preset.clone();
    }
    Self {
      name: Cow::Borrowed("Custom"),
      description: Cow::Borrowed("User-defined birth/survival rule"),
      birth: Cow::Owned(rule.births()),
      survival: Cow::Owned(rule.survivals()),
      notation: Cow::Owned(notation),
    }
  }

  pub fn check(&self) -> Result<(), RuleError> {
    if let Some(&n) = self.birth.iter().chain(self.survival.iter()).find(|&&n| n > 8) {
      return Err(RuleError::NeighborCount(n.into()));
    }
    let expected = format(&self.birth, &self.survival);
    if expected != self.notation {
      return Err(RuleError::Inconsistent {
        notation: self.notation.to_string(),
        expected,
      });
    }
    Ok(())
  }

  /// The transition table of a ruleset that passes [`Ruleset::check`].
  pub fn rule(&self) -> Result<Rule, RuleError> {
    self.check()?;
    let mut rule = Rule::new();
    for &n in self.birth.iter() {
      rule.set_birth(n)?;
    }
    for &n in self.survival.iter() {
      rule.set_survival(n)?;
    }
    Ok(rule)
  }
}

impl Default for Ruleset {
  fn default() -> Self {
    RULESETS[0].clone()
  }
}

impl TryFrom<&Ruleset> for Rule {
  type Error = RuleError;

  fn try_from(ruleset: &Ruleset) -> Result<Self, RuleError> {
    ruleset.rule()
  }
}

impl Display for Ruleset {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{} ({})", self.name, self.notation)
  }
}

pub fn parse(notation: &str) -> Result<Ruleset, RuleError> {
  notation.parse().map(Ruleset::from_rule)
}

/// Render counts as `B<sorted digits>/S<sorted digits>`.
pub fn format(birth: &[u8], survival: &[u8]) -> String {
  fn digits(counts: &[u8]) -> String {
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    sorted.iter().map(u8::to_string).collect()
  }
  format!("B{}/S{}", digits(birth), digits(survival))
}

pub fn validate(ruleset: &Ruleset) -> bool {
  ruleset.check().is_ok()
}

pub fn apply(alive: bool, live_neighbors: u8, ruleset: &Ruleset) -> bool {
  if alive {
    ruleset.survival.contains(&live_neighbors)
  } else {
    ruleset.birth.contains(&live_neighbors)
  }
}

pub fn by_notation(notation: &str) -> Option<&'static Ruleset> {
  RULESETS.iter().find(|r| r.notation == notation)
}

macro_rules! preset {
  ($name:expr, $description:expr, $birth:expr, $survival:expr, $notation:expr) => {
    Ruleset {
      name: Cow::Borrowed($name),
      description: Cow::Borrowed($description),
      birth: Cow::Borrowed(&$birth),
      survival: Cow::Borrowed(&$survival),
      notation: Cow::Borrowed($notation),
    }
  };
}

/// Built-in rules. Game of Life is first and is the default.
pub static RULESETS: &[Ruleset] = &[
  preset!(
    "Game of Life",
    "Conway's classic Game of Life",
    [3], [2, 3], "B3/S23"
  ),
  preset!(
    "HighLife",
    "Life with an extra birth condition that allows replicators",
    [3, 6], [2, 3], "B36/S23"
  ),
  preset!(
    "Day & Night",
    "Symmetric rule: live and dead cells behave alike",
    [3, 6, 7, 8], [3, 4, 6, 7, 8], "B3678/S34678"
  ),
  preset!(
    "Seeds",
    "Every live cell dies each generation, producing explosive growth",
    [2], [], "B2/S"
  ),
  preset!(
    "Maze",
    "Grows maze-like corridors that stabilize quickly",
    [3], [1, 2, 3, 4, 5], "B3/S12345"
  ),
  preset!(
    "Coral",
    "Slow coral-like growth",
    [3], [4, 5, 6, 7, 8], "B3/S45678"
  ),
  preset!(
    "Replicator",
    "Every pattern copies itself",
    [1, 3, 5, 7], [1, 3, 5, 7], "B1357/S1357"
  ),
  preset!(
    "Life Without Death",
    "Cells are born but never die",
    [3], [0, 1, 2, 3, 4, 5, 6, 7, 8], "B3/S012345678"
  ),
  preset!(
    "Move",
    "Favors patterns that travel across the grid",
    [3, 6, 8], [2, 4, 5], "B368/S245"
  ),
  preset!(
    "Diamoeba",
    "Diamond-shaped amoebas",
    [3, 5, 6, 7, 8], [5, 6, 7, 8], "B35678/S5678"
  ),
];
