//! Skip-vs-fatal classification of install failures.

/// Failure messages that mean "this package cannot be installed here" rather
/// than "something is broken".
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &["Cannot find a version", "compatible with this Unity version"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
  /// Count the package as skipped and continue with the queue.
  Skippable,
  /// Abandon the batch.
  Fatal,
}

/// Table of case-sensitive substrings marking a failure as skippable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailurePolicy {
  patterns: Vec<String>,
}

impl Default for FailurePolicy {
  fn default() -> Self {
    Self::new(DEFAULT_SKIP_PATTERNS.iter().map(|s| s.to_string()).collect())
  }
}

impl FailurePolicy {
  pub fn new(patterns: Vec<String>) -> Self {
    Self { patterns }
  }

  pub fn classify(&self, message: &str) -> FailureClass {
    if self.patterns.iter().any(|p| message.contains(p.as_str())) {
      FailureClass::Skippable
    } else {
      FailureClass::Fatal
    }
  }
}
