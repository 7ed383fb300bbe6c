//! The controller owns the orchestrator state and every host adapter, and
//! exposes one method per user command.
//!
//! Scheduling is cooperative: [`Controller::tick`] advances the install batch
//! by one step and never blocks. [`Controller::run_until_idle`] is the async
//! driver that sleeps between ticks.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::config::TemplarConfig;
use crate::confirm::Confirm;
use crate::diff::{BuiltinPolicy, packages_to_install};
use crate::host::{AssetIndex, FsAssetIndex, HostEnvironment};
use crate::install::{
  BatchOutcome, ExecutorConfig, FilePrefStore, InstallStateStore, InstallationState, ManifestPackageClient,
  PackageClient, PackageInstaller, PrefStore, ProgressSink, StateError, StepEvent, TracingProgress,
};
use crate::manifest::{DesiredManifest, load_desired_manifest, read_installed_state};
use crate::platform::paths::state_dir;
use crate::process::{CommandRunner, ProcessRunner};
use crate::setup::{
  AnalyzerError, CopyReport, FileOpError, FolderReport, FullSetupGuard, NugetChange, NugetError, NugetInstaller,
  PackagesConfigInstaller, PhaseResult, ScriptPreset, SetupPhases, SetupReport, build_analyzer, copy_config_files,
  copy_license_files, copy_script_templates, create_folder_structure, folders_phase,
};
use crate::submodule::{SubmoduleError, SubmoduleOutcome, SubmoduleProvisioner};

#[derive(Debug, Error)]
pub enum ControllerError {
  #[error(transparent)]
  State(#[from] StateError),

  #[error(transparent)]
  Files(#[from] FileOpError),

  #[error(transparent)]
  Submodule(#[from] SubmoduleError),

  #[error(transparent)]
  Analyzer(#[from] AnalyzerError),

  #[error(transparent)]
  Nuget(#[from] NugetError),

  #[error("template directory not found")]
  TemplateNotFound,

  #[error("no submodule named '{0}' in the template manifest")]
  UnknownSubmodule(String),

  #[error("the template manifest declares no analyzer")]
  NoAnalyzer,
}

impl ControllerError {
  /// Manual-recovery hint, when one exists.
  pub fn hint(&self) -> Option<String> {
    match self {
      ControllerError::Submodule(e) => e.hint(),
      ControllerError::Analyzer(e) => e.hint(),
      ControllerError::Nuget(NugetError::Unavailable) => {
        Some("run `templar install` first so the NuGet bridge package is present".to_string())
      }
      ControllerError::TemplateNotFound => Some("set 'templateDir' in templar.json".to_string()),
      _ => None,
    }
  }
}

/// The host adapters a controller drives.
pub struct Adapters {
  pub client: Box<dyn PackageClient>,
  pub index: Box<dyn AssetIndex>,
  pub prefs: Box<dyn PrefStore>,
  pub runner: Box<dyn CommandRunner>,
  pub nuget: Box<dyn NugetInstaller>,
  pub progress: Box<dyn ProgressSink>,
}

impl Adapters {
  /// Filesystem- and process-backed adapters for a real project.
  ///
  /// `handle` runs the package client's background writes.
  pub fn production(project_root: &Path, config: &TemplarConfig, handle: Handle) -> Self {
    Self {
      client: Box::new(ManifestPackageClient::new(project_root, handle)),
      index: Box::new(FsAssetIndex::new(project_root.to_path_buf(), config.template_dir.clone())),
      prefs: Box::new(FilePrefStore::new(state_dir(project_root))),
      runner: Box::new(ProcessRunner),
      nuget: Box::new(PackagesConfigInstaller::new(
        project_root.to_path_buf(),
        config.bridge_marker.clone(),
      )),
      progress: Box::new(TracingProgress),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStart {
  Started { count: usize },
  NothingToInstall,
  AlreadyRunning,
  /// An interrupted batch or Full Setup was picked up instead.
  Resumed(ResumeAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullSetupStart {
  /// Packages are installing; the rest runs when the queue drains.
  Installing { count: usize },
  /// Nothing to install; every phase already ran.
  Finished,
  AlreadyRunning,
  /// An interrupted batch or Full Setup was picked up instead.
  Resumed(ResumeAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAction {
  Resumed { remaining: usize },
  ContinuedFullSetup,
  Nothing,
}

/// Persisted state as reported by `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallStatus {
  pub state: Option<InstallationState>,
  pub full_setup_in_progress: bool,
}

pub struct Controller {
  project_root: PathBuf,
  config: TemplarConfig,
  client: Box<dyn PackageClient>,
  index: Box<dyn AssetIndex>,
  runner: Box<dyn CommandRunner>,
  nuget: Box<dyn NugetInstaller>,
  progress: Box<dyn ProgressSink>,
  store: InstallStateStore,
  installer: PackageInstaller,
  /// Present while a Full Setup waits for the package queue.
  setup_report: Option<SetupReport>,
  finished_report: Option<SetupReport>,
  last_outcome: Option<BatchOutcome>,
}

impl Controller {
  pub fn new(project_root: PathBuf, config: TemplarConfig, adapters: Adapters) -> Self {
    let Adapters {
      client,
      index,
      prefs,
      runner,
      nuget,
      progress,
    } = adapters;
    let installer = PackageInstaller::new(ExecutorConfig::from_config(&config));

    Self {
      project_root,
      config,
      client,
      index,
      runner,
      nuget,
      progress,
      store: InstallStateStore::new(prefs),
      installer,
      setup_report: None,
      finished_report: None,
      last_outcome: None,
    }
  }

  pub fn project_root(&self) -> &Path {
    &self.project_root
  }

  pub fn config(&self) -> &TemplarConfig {
    &self.config
  }

  pub fn is_idle(&self) -> bool {
    self.installer.is_idle()
  }

  /// The desired-state manifest, re-read on every call.
  pub fn manifest(&self) -> DesiredManifest {
    load_desired_manifest(self.index.as_ref())
  }

  fn template_dir(&self) -> Result<PathBuf, ControllerError> {
    self.index.find_template_dir().ok_or(ControllerError::TemplateNotFound)
  }

  fn provisioner(&self) -> SubmoduleProvisioner {
    SubmoduleProvisioner::new(self.project_root.clone(), self.config.scripts_dir.clone())
  }

  /// Declared packages missing from the host manifest, in queue-build order.
  pub fn packages_to_install(&self, manifest: &DesiredManifest) -> Vec<String> {
    let installed = read_installed_state(&self.project_root);
    let env = HostEnvironment::detect(&self.project_root);
    let builtins = BuiltinPolicy {
      packages: self.config.builtin_packages.clone(),
      min_major: self.config.builtin_min_major,
    };
    packages_to_install(manifest, &installed, &env, &builtins)
  }

  pub fn create_folders(&self) -> Result<FolderReport, ControllerError> {
    let manifest = self.manifest();
    let report = create_folder_structure(&self.project_root, &manifest.folder_structure)?;
    self.index.refresh();
    Ok(report)
  }

  /// Start installing every missing package.
  ///
  /// Work persisted by an earlier process takes precedence and is resumed.
  pub fn install_dependencies(&mut self) -> Result<InstallStart, ControllerError> {
    if !self.installer.is_idle() {
      return Ok(InstallStart::AlreadyRunning);
    }
    if let Some(action) = self.resume_pending()? {
      return Ok(InstallStart::Resumed(action));
    }
    let manifest = self.manifest();
    let packages = self.packages_to_install(&manifest);
    let count = packages.len();
    if !self.installer.start(packages, &self.store)? {
      info!("all packages already installed");
      return Ok(InstallStart::NothingToInstall);
    }
    Ok(InstallStart::Started { count })
  }

  /// Advance the install batch by one step.
  pub fn tick(&mut self) -> Result<StepEvent, ControllerError> {
    let event = self
      .installer
      .tick(self.client.as_mut(), &self.store, self.progress.as_mut())?;

    if let StepEvent::Finished(outcome) = &event {
      self.index.refresh();
      self.on_batch_finished(outcome.clone());
    }
    Ok(event)
  }

  /// Tick until no batch is running. Returns the outcome of the batch that
  /// finished, if any.
  pub async fn run_until_idle(&mut self, tick_interval: Duration) -> Result<Option<BatchOutcome>, ControllerError> {
    let mut outcome = None;
    while !self.installer.is_idle() {
      if let StepEvent::Finished(finished) = self.tick()? {
        outcome = Some(finished);
        break;
      }
      tokio::time::sleep(tick_interval).await;
    }
    Ok(outcome)
  }

  fn on_batch_finished(&mut self, outcome: BatchOutcome) {
    self.last_outcome = Some(outcome.clone());
    let Some(mut report) = self.setup_report.take() else {
      return;
    };

    match outcome {
      BatchOutcome::Completed { installed, skipped } => {
        report.record(
          PhaseResult::succeeded("packages").with_detail(format!("{} installed, {} skipped", installed, skipped)),
        );
        self.run_continuation(report);
      }
      BatchOutcome::Failed { package, message } => {
        report.record(PhaseResult::failed("packages", format!("{}: {}", package, message)));
        report.abort(format!("installation of '{}' failed", package));
        self.store.reset_full_setup();
        self.finished_report = Some(report);
      }
      BatchOutcome::Cancelled => {
        report.abort("cancelled");
        self.store.reset_full_setup();
        self.finished_report = Some(report);
      }
    }
  }

  fn run_continuation(&mut self, mut report: SetupReport) {
    let _guard = FullSetupGuard::new(&self.store);
    let manifest = load_desired_manifest(self.index.as_ref());
    let provisioner = SubmoduleProvisioner::new(self.project_root.clone(), self.config.scripts_dir.clone());

    let mut phases = SetupPhases {
      project_root: &self.project_root,
      template_dir: self.index.find_template_dir(),
      manifest: &manifest,
      runner: self.runner.as_mut(),
      nuget: self.nuget.as_mut(),
      index: self.index.as_ref(),
      provisioner,
      build_tool: &self.config.build_tool,
    };
    phases.run_continuation(&mut report);
    self.finished_report = Some(report);
  }

  /// Run every phase: folders, packages, then the continuation once the
  /// package queue drains.
  pub fn full_setup(&mut self) -> Result<FullSetupStart, ControllerError> {
    if !self.installer.is_idle() {
      return Ok(FullSetupStart::AlreadyRunning);
    }
    if let Some(action) = self.resume_pending()? {
      return Ok(FullSetupStart::Resumed(action));
    }

    let manifest = self.manifest();
    let mut report = SetupReport::default();
    report.record(folders_phase(&self.project_root, &manifest, self.index.as_ref()));

    self.store.set_full_setup_in_progress(true)?;

    let packages = self.packages_to_install(&manifest);
    let count = packages.len();
    match self.installer.start(packages, &self.store) {
      Ok(true) => {
        self.setup_report = Some(report);
        Ok(FullSetupStart::Installing { count })
      }
      Ok(false) => {
        report.record(PhaseResult::succeeded("packages").with_detail("nothing to install"));
        self.run_continuation(report);
        Ok(FullSetupStart::Finished)
      }
      Err(e) => {
        self.store.reset_full_setup();
        Err(e.into())
      }
    }
  }

  /// Resume an interrupted batch or Full Setup from persisted state.
  pub fn restore_after_reload(&mut self) -> Result<ResumeAction, ControllerError> {
    let state = match self.store.load() {
      Ok(state) => state,
      Err(e @ StateError::Corrupt { .. }) => {
        warn!(error = %e, "discarding corrupt installation state");
        self.store.clear()?;
        None
      }
      Err(e) => return Err(e.into()),
    };
    let full_setup = self.store.full_setup_in_progress()?;

    match state {
      Some(state) if state.is_installing && !state.remaining_packages.is_empty() => {
        let remaining = state.remaining_packages.len();
        self.installer.resume(state);
        if full_setup {
          self.setup_report = Some(SetupReport::default());
        }
        Ok(ResumeAction::Resumed { remaining })
      }
      state => {
        if state.is_some() {
          self.store.clear()?;
        }
        if full_setup {
          self.run_continuation(SetupReport::default());
          return Ok(ResumeAction::ContinuedFullSetup);
        }
        Ok(ResumeAction::Nothing)
      }
    }
  }

  fn resume_pending(&mut self) -> Result<Option<ResumeAction>, ControllerError> {
    match self.restore_after_reload()? {
      ResumeAction::Nothing => Ok(None),
      action => {
        info!(?action, "resuming work left by a previous run");
        Ok(Some(action))
      }
    }
  }

  /// Abandon the running batch and any pending Full Setup.
  ///
  /// Returns `true` if there was anything to cancel.
  pub fn cancel(&mut self) -> Result<bool, ControllerError> {
    let persisted = self.store.load().ok().flatten().is_some();
    let full_setup = self.setup_report.is_some() || self.store.full_setup_in_progress()?;

    let was_installing = self.installer.cancel(&self.store, self.progress.as_mut())?;
    self.store.set_full_setup_in_progress(false)?;

    if let Some(mut report) = self.setup_report.take() {
      report.abort("cancelled");
      self.finished_report = Some(report);
    }
    if was_installing {
      self.last_outcome = Some(BatchOutcome::Cancelled);
    }
    Ok(was_installing || persisted || full_setup)
  }

  pub fn status(&self) -> Result<InstallStatus, ControllerError> {
    Ok(InstallStatus {
      state: self.store.load()?,
      full_setup_in_progress: self.store.full_setup_in_progress()?,
    })
  }

  /// Declare every manifest NuGet package.
  pub fn install_nuget(&mut self) -> Result<Vec<(String, NugetChange)>, ControllerError> {
    let manifest = self.manifest();
    if !self.nuget.is_available() {
      return Err(NugetError::Unavailable.into());
    }
    let mut changes = Vec::new();
    for package in &manifest.nuget_packages {
      let change = self.nuget.install_package(&package.id, &package.version)?;
      changes.push((package.id.clone(), change));
    }
    self.index.refresh();
    Ok(changes)
  }

  pub fn copy_config_files(&self) -> Result<CopyReport, ControllerError> {
    let template_dir = self.template_dir()?;
    let manifest = self.manifest();
    let report = copy_config_files(&template_dir, &self.project_root, &manifest.config_files);
    self.index.refresh();
    Ok(report)
  }

  pub fn copy_license_files(&self) -> Result<CopyReport, ControllerError> {
    let template_dir = self.template_dir()?;
    let manifest = self.manifest();
    let report = copy_license_files(&template_dir, &self.project_root, &manifest.license_folder_path)?;
    self.index.refresh();
    Ok(report)
  }

  pub fn copy_scripts(&self, preset: ScriptPreset) -> Result<CopyReport, ControllerError> {
    let template_dir = self.template_dir()?;
    let report = copy_script_templates(&template_dir, &self.project_root, &preset.target(), &preset.filter())?;
    self.index.refresh();
    Ok(report)
  }

  /// Set up one declared submodule, looked up by name or link name.
  pub fn setup_submodule(&mut self, name: &str, confirm: &mut dyn Confirm) -> Result<SubmoduleOutcome, ControllerError> {
    let manifest = self.manifest();
    let spec = manifest
      .submodules
      .iter()
      .find(|s| s.name == name || s.link_name == name)
      .ok_or_else(|| ControllerError::UnknownSubmodule(name.to_string()))?;

    let outcome = self.provisioner().setup_submodule(self.runner.as_mut(), spec, confirm)?;
    self.index.refresh();
    Ok(outcome)
  }

  /// Commands that set up the named submodule by hand.
  pub fn submodule_manual_steps(&self, name: &str) -> Result<Vec<String>, ControllerError> {
    let manifest = self.manifest();
    let spec = manifest
      .submodules
      .iter()
      .find(|s| s.name == name || s.link_name == name)
      .ok_or_else(|| ControllerError::UnknownSubmodule(name.to_string()))?;
    Ok(self.provisioner().manual_steps(spec))
  }

  /// Set up the analyzer submodule and build it. Returns the copied DLLs, or
  /// `None` if the user declined to replace an existing directory.
  pub fn setup_analyzer(&mut self, confirm: &mut dyn Confirm) -> Result<Option<Vec<PathBuf>>, ControllerError> {
    let manifest = self.manifest();
    let spec = manifest.analyzers.as_ref().ok_or(ControllerError::NoAnalyzer)?;

    let outcome = self
      .provisioner()
      .setup_submodule(self.runner.as_mut(), &spec.as_submodule(), confirm)?;
    if outcome == SubmoduleOutcome::Declined {
      return Ok(None);
    }

    let copied = build_analyzer(self.runner.as_mut(), &self.project_root, spec, &self.config.build_tool)?;
    self.index.refresh();
    Ok(Some(copied))
  }

  /// The report of the most recent Full Setup, once it has finished.
  pub fn take_report(&mut self) -> Option<SetupReport> {
    self.finished_report.take()
  }

  pub fn last_outcome(&self) -> Option<&BatchOutcome> {
    self.last_outcome.as_ref()
  }
}
