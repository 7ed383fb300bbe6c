//! Tick-driven package install executor.
//!
//! Each item moves through `dispatched -> polling -> {succeeded | skipped |
//! fatal}`. [`PackageInstaller::tick`] performs at most one transition and
//! never blocks; a driver calls it repeatedly until the installer is idle.

use tracing::{error, info, warn};

use super::client::{AddRequest, PackageClient, RequestStatus};
use super::policy::{FailureClass, FailurePolicy};
use super::progress::{ProgressSink, progress_fraction};
use super::queue::InstallQueue;
use super::state::{InstallStateStore, InstallationState, StateError};
use crate::config::TemplarConfig;

/// Title used for progress reports.
const PROGRESS_TITLE: &str = "Installing packages";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
  /// Ticks to wait after a success before the next dispatch.
  pub success_delay_ticks: u32,
  /// Ticks to wait before the first dispatch after a resume.
  pub resume_delay_ticks: u32,
  pub bridge_marker: String,
  pub policy: FailurePolicy,
}

impl Default for ExecutorConfig {
  fn default() -> Self {
    Self::from_config(&TemplarConfig::default())
  }
}

impl ExecutorConfig {
  pub fn from_config(config: &TemplarConfig) -> Self {
    Self {
      success_delay_ticks: config.success_delay_ticks(),
      resume_delay_ticks: 1,
      bridge_marker: config.bridge_marker.clone(),
      policy: FailurePolicy::new(config.failure_patterns.clone()),
    }
  }
}

/// How a batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
  Completed { installed: usize, skipped: usize },
  Failed { package: String, message: String },
  Cancelled,
}

impl BatchOutcome {
  /// Manual-recovery hint for a failed batch.
  pub fn hint(&self) -> Option<String> {
    match self {
      BatchOutcome::Failed { package, .. } => Some(format!(
        "add '{}' manually through the package manager, then run the install again",
        package
      )),
      _ => None,
    }
  }
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepEvent {
  /// No batch is running.
  Idle,
  /// Counting down a delay.
  Waiting,
  Dispatched { package: String },
  Pending { package: String },
  Succeeded { package: String },
  Skipped { package: String, message: String },
  Finished(BatchOutcome),
}

struct InFlight {
  package: String,
  request: Box<dyn AddRequest>,
}

/// Serial installer over an [`InstallQueue`].
pub struct PackageInstaller {
  config: ExecutorConfig,
  queue: InstallQueue,
  installing: bool,
  total: usize,
  skipped: usize,
  current: Option<InFlight>,
  delay_ticks: u32,
}

impl PackageInstaller {
  pub fn new(config: ExecutorConfig) -> Self {
    Self {
      config,
      queue: InstallQueue::default(),
      installing: false,
      total: 0,
      skipped: 0,
      current: None,
      delay_ticks: 0,
    }
  }

  pub fn is_idle(&self) -> bool {
    !self.installing
  }

  pub fn total(&self) -> usize {
    self.total
  }

  pub fn skipped(&self) -> usize {
    self.skipped
  }

  /// Identifiers not yet confirmed installed, in-flight item first.
  pub fn remaining(&self) -> Vec<String> {
    let mut remaining = Vec::with_capacity(self.queue.len() + 1);
    if let Some(current) = &self.current {
      remaining.push(current.package.clone());
    }
    remaining.extend(self.queue.remaining());
    remaining
  }

  pub fn to_persisted(&self) -> InstallationState {
    InstallationState {
      remaining_packages: self.remaining(),
      is_installing: self.installing,
      total_packages: self.total,
      skipped_packages: self.skipped,
    }
  }

  /// Start a new batch. Returns `false` if a batch is already running or
  /// `packages` is empty.
  pub fn start(&mut self, packages: Vec<String>, store: &InstallStateStore) -> Result<bool, StateError> {
    if self.installing {
      warn!("installation already in progress");
      return Ok(false);
    }
    if packages.is_empty() {
      return Ok(false);
    }

    self.queue = InstallQueue::build(packages, &self.config.bridge_marker);
    self.total = self.queue.len();
    self.skipped = 0;
    self.current = None;
    self.delay_ticks = 0;
    self.installing = true;

    info!(total = self.total, "starting package installation");
    store.save(&self.to_persisted())?;
    Ok(true)
  }

  /// Continue a batch from a persisted snapshot after a one-tick delay.
  pub fn resume(&mut self, state: InstallationState) {
    self.queue = InstallQueue::from_remaining(state.remaining_packages);
    self.total = state.total_packages.max(self.queue.len());
    self.skipped = state.skipped_packages;
    self.current = None;
    self.delay_ticks = self.config.resume_delay_ticks;
    self.installing = true;
    info!(
      remaining = self.queue.len(),
      total = self.total,
      "resuming package installation"
    );
  }

  /// Drop the in-flight request and the queue, and clear persisted state.
  ///
  /// Returns `true` if a batch was running. A late completion of the dropped
  /// request is never observed.
  pub fn cancel(&mut self, store: &InstallStateStore, progress: &mut dyn ProgressSink) -> Result<bool, StateError> {
    self.current = None;
    let was_installing = self.installing;
    self.reset();
    progress.clear();
    store.clear()?;
    if was_installing {
      info!("package installation cancelled");
    }
    Ok(was_installing)
  }

  /// Advance the batch by at most one transition.
  pub fn tick(
    &mut self,
    client: &mut dyn PackageClient,
    store: &InstallStateStore,
    progress: &mut dyn ProgressSink,
  ) -> Result<StepEvent, StateError> {
    if !self.installing {
      return Ok(StepEvent::Idle);
    }
    if self.delay_ticks > 0 {
      self.delay_ticks -= 1;
      return Ok(StepEvent::Waiting);
    }

    let Some(mut in_flight) = self.current.take() else {
      return self.dispatch_next(client, store, progress);
    };

    match in_flight.request.poll() {
      RequestStatus::Pending => {
        let package = in_flight.package.clone();
        self.current = Some(in_flight);
        Ok(StepEvent::Pending { package })
      }
      RequestStatus::Succeeded => {
        let package = in_flight.package;
        info!(package = %package, "installed package");
        store.save(&self.to_persisted())?;
        progress.report(
          &format!("Installed {}", package),
          progress_fraction(self.total, self.queue.len()),
        );
        self.delay_ticks = self.config.success_delay_ticks;
        Ok(StepEvent::Succeeded { package })
      }
      RequestStatus::Failed(message) => {
        let package = in_flight.package;
        match self.config.policy.classify(&message) {
          FailureClass::Skippable => {
            warn!(package = %package, reason = %message, "skipping package");
            self.skipped += 1;
            store.save(&self.to_persisted())?;
            Ok(StepEvent::Skipped { package, message })
          }
          FailureClass::Fatal => {
            error!(package = %package, reason = %message, "package installation failed");
            self.reset();
            progress.clear();
            store.clear()?;
            Ok(StepEvent::Finished(BatchOutcome::Failed { package, message }))
          }
        }
      }
    }
  }

  fn dispatch_next(
    &mut self,
    client: &mut dyn PackageClient,
    store: &InstallStateStore,
    progress: &mut dyn ProgressSink,
  ) -> Result<StepEvent, StateError> {
    let Some(package) = self.queue.dequeue() else {
      let outcome = BatchOutcome::Completed {
        installed: self.total.saturating_sub(self.skipped),
        skipped: self.skipped,
      };
      info!(installed = self.total.saturating_sub(self.skipped), skipped = self.skipped, "package installation complete");
      self.reset();
      progress.clear();
      store.clear()?;
      return Ok(StepEvent::Finished(outcome));
    };

    let position = self.total - self.queue.len();
    progress.report(
      &format!("{}: {} ({}/{})", PROGRESS_TITLE, package, position, self.total),
      progress_fraction(self.total, self.queue.len()),
    );

    // Persist with the item still listed so a teardown re-dispatches it.
    let snapshot = InstallationState {
      remaining_packages: std::iter::once(package.clone()).chain(self.queue.remaining()).collect(),
      is_installing: true,
      total_packages: self.total,
      skipped_packages: self.skipped,
    };
    store.save(&snapshot)?;

    info!(package = %package, position, total = self.total, "installing package");
    let request = client.add(&package);
    self.current = Some(InFlight {
      package: package.clone(),
      request,
    });
    Ok(StepEvent::Dispatched { package })
  }

  fn reset(&mut self) {
    self.queue.clear();
    self.current = None;
    self.installing = false;
    self.delay_ticks = 0;
    self.total = 0;
    self.skipped = 0;
  }
}
