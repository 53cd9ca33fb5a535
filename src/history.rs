use serde::{Deserialize, Serialize};
use crate::grid::{AgeGrid, CellGrid};

pub const HISTORY_CAPACITY: usize = 100;

/// Largest history a configuration may ask for. Slots are allocated up
/// front.
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

/// State of the universe before one step.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub grid: CellGrid,
  pub ages: AgeGrid,
}

/// Bounded step-back history: a ring of `capacity` slots. Pushing onto a
/// full buffer overwrites the oldest entry; `pop` returns the newest.
#[derive(Clone, Debug)]
pub struct HistoryBuffer {
  slots: Vec<Option<HistoryEntry>>,
  /// index of the oldest entry
  head: usize,
  len: usize,
}

impl HistoryBuffer {
  pub fn new() -> Self {
    Self::with_capacity(HISTORY_CAPACITY)
  }

  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      slots: (0..capacity).map(|_| None).collect(),
      head: 0,
      len: 0,
    }
  }

  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn can_pop(&self) -> bool {
    self.len > 0
  }

  pub fn push(&mut self, entry: HistoryEntry) {
    let capacity = self.capacity();
    if capacity == 0 {
      return;
    }

    let tail = (self.head + self.len) % capacity;
    self.slots[tail] = Some(entry);
    if self.len == capacity {
      self.head = (self.head + 1) % capacity;
    } else {
      self.len += 1;
    }
  }

  pub fn pop(&mut self) -> Option<HistoryEntry> {
    if self.len == 0 {
      return None;
    }

    self.len -= 1;
    let newest = (self.head + self.len) % self.capacity();
    self.slots[newest].take()
  }

  /// The entry `pop` would return.
  pub fn peek(&self) -> Option<&HistoryEntry> {
    if self.len == 0 {
      return None;
    }

    let newest = (self.head + self.len - 1) % self.capacity();
    self.slots[newest].as_ref()
  }

  pub fn clear(&mut self) {
    for slot in self.slots.iter_mut() {
      *slot = None;
    }
    self.head = 0;
    self.len = 0;
  }
}

impl Default for HistoryBuffer {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(tag: usize) -> HistoryEntry {
    HistoryEntry {
      grid: CellGrid::new(tag, 1),
      ages: AgeGrid::new(tag, 1),
    }
  }

  #[test]
  fn pop_is_lifo() {
    let mut history = HistoryBuffer::new();
    assert!(!history.can_pop());
    assert_eq!(history.pop(), None);

    history.push(entry(1));
    history.push(entry(2));
    assert_eq!(history.peek(), Some(&entry(2)));
    assert_eq!(history.pop(), Some(entry(2)));
    assert_eq!(history.pop(), Some(entry(1)));
    assert_eq!(history.pop(), None);
  }

  #[test]
  fn evicts_oldest_beyond_capacity() {
    let mut history = HistoryBuffer::new();
    for i in 0..150 {
      history.push(entry(i));
    }
    assert_eq!(history.len(), HISTORY_CAPACITY);

    let mut popped = vec![];
    while let Some(e) = history.pop() {
      popped.push(e.grid.width());
    }
    let expected: Vec<_> = (50..150).rev().collect();
    assert_eq!(popped, expected);
  }

  #[test]
  fn push_after_pop_on_full_ring() {
    let mut history = HistoryBuffer::with_capacity(3);
    for i in 0..5 {
      history.push(entry(i));
    }
    assert_eq!(history.pop(), Some(entry(4)));
    history.push(entry(9));
    assert_eq!(history.len(), 3);
    assert_eq!(history.pop(), Some(entry(9)));
    assert_eq!(history.pop(), Some(entry(3)));
    assert_eq!(history.pop(), Some(entry(2)));
    assert!(history.is_empty());
  }

  #[test]
  fn clear_and_zero_capacity() {
    let mut history = HistoryBuffer::with_capacity(2);
    history.push(entry(1));
    history.clear();
    assert!(!history.can_pop());

    let mut none = HistoryBuffer::with_capacity(0);
    none.push(entry(1));
    assert_eq!(none.pop(), None);
  }
}
