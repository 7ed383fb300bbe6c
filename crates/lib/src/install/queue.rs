use std::collections::VecDeque;

/// FIFO of package identifiers awaiting installation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallQueue {
  items: VecDeque<String>,
}

impl InstallQueue {
  /// Build a queue from the differ's output.
  ///
  /// The first identifier containing `bridge_marker` moves to the front; every
  /// other identifier keeps its relative order.
  pub fn build(list: Vec<String>, bridge_marker: &str) -> Self {
    let mut items: VecDeque<String> = list.into();
    if !bridge_marker.is_empty()
      && let Some(pos) = items.iter().position(|id| id.contains(bridge_marker))
      && pos > 0
      && let Some(bridge) = items.remove(pos)
    {
      items.push_front(bridge);
    }
    Self { items }
  }

  /// Rebuild a queue from a persisted snapshot, preserving order exactly.
  pub fn from_remaining(remaining: Vec<String>) -> Self {
    Self { items: remaining.into() }
  }

  pub fn front(&self) -> Option<&str> {
    self.items.front().map(String::as_str)
  }

  pub fn dequeue(&mut self) -> Option<String> {
    self.items.pop_front()
  }

  /// Identifiers still queued, front first.
  pub fn remaining(&self) -> Vec<String> {
    self.items.iter().cloned().collect()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn clear(&mut self) {
    self.items.clear();
  }
}
