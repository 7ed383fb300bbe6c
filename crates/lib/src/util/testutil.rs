//! Test doubles for the host adapters.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::host::AssetIndex;
use crate::install::client::add_dependency;
use crate::install::{AddRequest, PackageClient, ProgressSink, RequestStatus};
use crate::process::{CommandOutput, CommandRunner, ProcessError, display_command};
use crate::setup::{NugetChange, NugetError, NugetInstaller};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Asset index with a fixed template directory.
#[derive(Debug, Default)]
pub struct StaticAssetIndex {
  dir: Option<PathBuf>,
  pub refreshes: Cell<usize>,
}

impl StaticAssetIndex {
  pub fn new(dir: Option<PathBuf>) -> Self {
    Self {
      dir,
      refreshes: Cell::new(0),
    }
  }
}

impl AssetIndex for StaticAssetIndex {
  fn refresh(&self) {
    self.refreshes.set(self.refreshes.get() + 1);
  }

  fn find_template_dir(&self) -> Option<PathBuf> {
    self.dir.clone()
  }
}

/// Package client whose requests succeed unless told otherwise.
///
/// Clones share the dispatch log, so a test can keep one copy while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
  pending_polls: u32,
  failures: BTreeMap<String, String>,
  manifest: Option<PathBuf>,
  dispatched: Rc<RefCell<Vec<String>>>,
}

impl ScriptedClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every request reports `Pending` this many times before completing.
  pub fn pending_polls(mut self, polls: u32) -> Self {
    self.pending_polls = polls;
    self
  }

  /// Requests for `id` fail with `message`.
  pub fn fail(mut self, id: &str, message: &str) -> Self {
    self.failures.insert(id.to_string(), message.to_string());
    self
  }

  /// Successful requests are written into the host manifest at `path`.
  pub fn installing_into(mut self, path: PathBuf) -> Self {
    self.manifest = Some(path);
    self
  }

  pub fn dispatched(&self) -> Vec<String> {
    self.dispatched.borrow().clone()
  }
}

impl PackageClient for ScriptedClient {
  fn add(&mut self, id: &str) -> Box<dyn AddRequest> {
    self.dispatched.borrow_mut().push(id.to_string());
    let result = match self.failures.get(id) {
      Some(message) => RequestStatus::Failed(message.clone()),
      None => RequestStatus::Succeeded,
    };
    Box::new(ScriptedRequest {
      id: id.to_string(),
      pending: self.pending_polls,
      result,
      manifest: self.manifest.clone(),
    })
  }
}

struct ScriptedRequest {
  id: String,
  pending: u32,
  result: RequestStatus,
  manifest: Option<PathBuf>,
}

impl AddRequest for ScriptedRequest {
  fn poll(&mut self) -> RequestStatus {
    if self.pending > 0 {
      self.pending -= 1;
      return RequestStatus::Pending;
    }
    if self.result == RequestStatus::Succeeded
      && let Some(path) = self.manifest.take()
      && let Err(e) = add_dependency(&path, &self.id)
    {
      self.result = RequestStatus::Failed(e.to_string());
    }
    self.result.clone()
  }
}

type Handler = Box<dyn FnMut(&str) -> Result<CommandOutput, ProcessError>>;

/// Command runner that records command lines and answers through a handler.
pub struct RecordingRunner {
  commands: Vec<String>,
  handler: Handler,
}

impl RecordingRunner {
  /// Every command succeeds with empty output.
  pub fn new() -> Self {
    Self::with_handler(|_| {
      Ok(CommandOutput {
        status: Some(0),
        ..Default::default()
      })
    })
  }

  pub fn with_handler(handler: impl FnMut(&str) -> Result<CommandOutput, ProcessError> + 'static) -> Self {
    Self {
      commands: Vec::new(),
      handler: Box::new(handler),
    }
  }

  pub fn commands(&self) -> Vec<String> {
    self.commands.clone()
  }
}

impl CommandRunner for RecordingRunner {
  fn run(&mut self, program: &str, args: &[&str], _cwd: &std::path::Path) -> Result<CommandOutput, ProcessError> {
    let command = display_command(program, args);
    self.commands.push(command.clone());
    (self.handler)(&command)
  }
}

/// NuGet installer that records declarations in memory.
#[derive(Debug, Default)]
pub struct FakeNuget {
  available: bool,
  installed: Vec<(String, String)>,
}

impl FakeNuget {
  pub fn available() -> Self {
    Self {
      available: true,
      installed: Vec::new(),
    }
  }

  pub fn unavailable() -> Self {
    Self::default()
  }

  pub fn installed(&self) -> Vec<(String, String)> {
    self.installed.clone()
  }
}

impl NugetInstaller for FakeNuget {
  fn is_available(&self) -> bool {
    self.available
  }

  fn install_package(&mut self, id: &str, version: &str) -> Result<NugetChange, NugetError> {
    if !self.available {
      return Err(NugetError::Unavailable);
    }
    self.installed.push((id.to_string(), version.to_string()));
    Ok(NugetChange::Added)
  }
}

/// Progress sink that keeps every report.
#[derive(Debug, Default)]
pub struct RecordingProgress {
  pub reports: Vec<(String, f32)>,
  pub cleared: bool,
}

impl ProgressSink for RecordingProgress {
  fn report(&mut self, label: &str, fraction: f32) {
    self.reports.push((label.to_string(), fraction));
  }

  fn clear(&mut self) {
    self.cleared = true;
  }
}
