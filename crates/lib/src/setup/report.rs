use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
  Succeeded,
  Skipped,
  Failed,
}

/// Outcome of one Full Setup phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseResult {
  pub name: String,
  pub status: PhaseStatus,
  /// Error text plus manual hint for failures, reason for skips.
  pub detail: Option<String>,
}

impl PhaseResult {
  pub fn succeeded(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      status: PhaseStatus::Succeeded,
      detail: None,
    }
  }

  pub fn skipped(name: impl Into<String>, reason: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      status: PhaseStatus::Skipped,
      detail: Some(reason.into()),
    }
  }

  pub fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      status: PhaseStatus::Failed,
      detail: Some(detail.into()),
    }
  }

  pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
    self.detail = Some(detail.into());
    self
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SetupSummary {
  Completed,
  CompletedWithErrors,
  Aborted,
}

impl fmt::Display for SetupSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SetupSummary::Completed => write!(f, "completed"),
      SetupSummary::CompletedWithErrors => write!(f, "completed with errors"),
      SetupSummary::Aborted => write!(f, "aborted"),
    }
  }
}

/// Phase-by-phase log of a Full Setup run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SetupReport {
  pub phases: Vec<PhaseResult>,
  /// Why the run stopped early, if it did.
  pub aborted: Option<String>,
}

impl SetupReport {
  pub fn record(&mut self, result: PhaseResult) {
    self.phases.push(result);
  }

  pub fn abort(&mut self, reason: impl Into<String>) {
    self.aborted = Some(reason.into());
  }

  pub fn failures(&self) -> impl Iterator<Item = &PhaseResult> {
    self.phases.iter().filter(|p| p.status == PhaseStatus::Failed)
  }

  pub fn summary(&self) -> SetupSummary {
    if self.aborted.is_some() {
      SetupSummary::Aborted
    } else if self.failures().next().is_some() {
      SetupSummary::CompletedWithErrors
    } else {
      SetupSummary::Completed
    }
  }
}
