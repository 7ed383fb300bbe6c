//! Per-invocation wiring of the controller to the real project.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::runtime::Runtime;
use tracing::debug;

use templar_lib::config::TemplarConfig;
use templar_lib::controller::{Adapters, Controller};
use templar_lib::install::BatchOutcome;
use templar_lib::platform::paths::project_root;

use crate::output::TermProgress;

/// A controller bound to one project, plus the runtime its package client
/// and driver loop run on.
pub struct Session {
  runtime: Runtime,
  pub controller: Controller,
}

impl Session {
  pub fn open(project: Option<&Path>) -> Result<Self> {
    let root = project_root(project).context("Failed to resolve project root")?;
    if !root.is_dir() {
      bail!("Project root {} is not a directory", root.display());
    }

    let config = TemplarConfig::load(&root).context("Failed to load project configuration")?;
    debug!(root = %root.display(), ?config, "loaded configuration");

    let runtime = Runtime::new().context("Failed to create async runtime")?;
    let mut adapters = Adapters::production(&root, &config, runtime.handle().clone());
    adapters.progress = Box::new(TermProgress::new());

    Ok(Self {
      runtime,
      controller: Controller::new(root, config, adapters),
    })
  }

  /// Drive the running batch to completion.
  pub fn drain(&mut self) -> Result<Option<BatchOutcome>> {
    let interval = self.controller.config().tick_interval();
    let outcome = self.runtime.block_on(self.controller.run_until_idle(interval))?;
    Ok(outcome)
  }
}
