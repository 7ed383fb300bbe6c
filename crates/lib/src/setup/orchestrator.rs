//! Full Setup.
//!
//! Phases run in a fixed order:
//!
//! 1. folder structure
//! 2. package queue (asynchronous, may span a reload)
//! 3. NuGet packages
//! 4. config files
//! 5. one phase per declared submodule
//! 6. analyzer submodule, then analyzer build
//!
//! Phases 3 onward form the continuation, which runs once the package queue
//! drains, either in the same process or after a resume. Failures are scoped
//! to their phase; the analyzer build is the only phase that depends on an
//! earlier one.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use super::analyzer::build_analyzer;
use super::files::copy_config_files;
use super::folders::create_folder_structure;
use super::nuget::NugetInstaller;
use super::report::{PhaseResult, PhaseStatus, SetupReport};
use crate::confirm::{AutoConfirm, Confirm};
use crate::host::AssetIndex;
use crate::install::InstallStateStore;
use crate::manifest::{DesiredManifest, SubmoduleSpec};
use crate::process::CommandRunner;
use crate::submodule::{SubmoduleOutcome, SubmoduleProvisioner};

/// Clears the persisted Full Setup flag when dropped.
pub struct FullSetupGuard<'a> {
  store: &'a InstallStateStore,
}

impl<'a> FullSetupGuard<'a> {
  pub fn new(store: &'a InstallStateStore) -> Self {
    Self { store }
  }
}

impl Drop for FullSetupGuard<'_> {
  fn drop(&mut self) {
    self.store.reset_full_setup();
  }
}

/// Everything the synchronous phases need, borrowed from the controller.
pub struct SetupPhases<'a> {
  pub project_root: &'a Path,
  pub template_dir: Option<PathBuf>,
  pub manifest: &'a DesiredManifest,
  pub runner: &'a mut dyn CommandRunner,
  pub nuget: &'a mut dyn NugetInstaller,
  pub index: &'a dyn AssetIndex,
  pub provisioner: SubmoduleProvisioner,
  pub build_tool: &'a str,
}

/// Phase 1: create the declared folder structure.
pub fn folders_phase(project_root: &Path, manifest: &DesiredManifest, index: &dyn AssetIndex) -> PhaseResult {
  match create_folder_structure(project_root, &manifest.folder_structure) {
    Ok(report) => {
      index.refresh();
      PhaseResult::succeeded("folders").with_detail(format!(
        "{} created, {} existing",
        report.created.len(),
        report.existing.len()
      ))
    }
    Err(e) => PhaseResult::failed("folders", e.to_string()),
  }
}

impl SetupPhases<'_> {
  pub fn nuget(&mut self) -> PhaseResult {
    const NAME: &str = "nuget";
    if self.manifest.nuget_packages.is_empty() {
      return PhaseResult::skipped(NAME, "no NuGet packages declared");
    }
    if !self.nuget.is_available() {
      warn!("NuGet bridge package not installed, skipping NuGet packages");
      return PhaseResult::skipped(
        NAME,
        "NuGet bridge package not installed; install it, then run `templar nuget`",
      );
    }

    let mut failures = Vec::new();
    for package in &self.manifest.nuget_packages {
      if let Err(e) = self.nuget.install_package(&package.id, &package.version) {
        warn!(package = %package.id, error = %e, "NuGet install failed");
        failures.push(format!("{} {}: {}", package.id, package.version, e));
      }
    }

    if failures.is_empty() {
      PhaseResult::succeeded(NAME).with_detail(format!("{} declared", self.manifest.nuget_packages.len()))
    } else {
      PhaseResult::failed(NAME, failures.join("; "))
    }
  }

  pub fn config_files(&self) -> PhaseResult {
    const NAME: &str = "config files";
    let Some(template_dir) = &self.template_dir else {
      return PhaseResult::failed(NAME, "template directory not found");
    };

    let report = copy_config_files(template_dir, self.project_root, &self.manifest.config_files);
    self.index.refresh();
    if report.is_ok() {
      PhaseResult::succeeded(NAME).with_detail(format!("{} copied", report.copied.len()))
    } else {
      let detail = report
        .failed
        .iter()
        .map(|(name, e)| format!("{}: {}", name, e))
        .collect::<Vec<_>>()
        .join("; ");
      PhaseResult::failed(NAME, detail)
    }
  }

  pub fn submodule(&mut self, spec: &SubmoduleSpec, confirm: &mut dyn Confirm) -> PhaseResult {
    let name = format!("submodule {}", spec.name);
    match self.provisioner.setup_submodule(&mut *self.runner, spec, confirm) {
      Ok(SubmoduleOutcome::Declined) => PhaseResult::skipped(name, "replacement declined"),
      Ok(outcome) => {
        self.index.refresh();
        PhaseResult::succeeded(name).with_detail(format!("{:?}", outcome))
      }
      Err(e) => {
        error!(submodule = %spec.name, error = %e, "submodule setup failed");
        let detail = match e.hint() {
          Some(hint) => format!("{}; run manually: {}", e, hint),
          None => e.to_string(),
        };
        PhaseResult::failed(name, detail)
      }
    }
  }

  /// Analyzer submodule followed by the build, which is skipped if the
  /// submodule did not succeed.
  pub fn analyzer(&mut self, confirm: &mut dyn Confirm) -> Vec<PhaseResult> {
    let manifest = self.manifest;
    let Some(spec) = &manifest.analyzers else {
      return Vec::new();
    };

    let submodule = self.submodule(&spec.as_submodule(), confirm);
    let build = if submodule.status == PhaseStatus::Succeeded {
      match build_analyzer(&mut *self.runner, self.project_root, spec, self.build_tool) {
        Ok(copied) => {
          self.index.refresh();
          PhaseResult::succeeded("analyzer build").with_detail(format!("{} DLL(s) copied", copied.len()))
        }
        Err(e) => {
          let detail = match e.hint() {
            Some(hint) => format!("{}; {}", e, hint),
            None => e.to_string(),
          };
          PhaseResult::failed("analyzer build", detail)
        }
      }
    } else {
      PhaseResult::skipped("analyzer build", "analyzer submodule not available")
    };

    vec![submodule, build]
  }

  /// Phases 3 onward. Destructive prompts are auto-confirmed.
  pub fn run_continuation(&mut self, report: &mut SetupReport) {
    info!("continuing full setup");
    let mut confirm = AutoConfirm(true);

    report.record(self.nuget());
    report.record(self.config_files());

    let manifest = self.manifest;
    for spec in &manifest.submodules {
      report.record(self.submodule(spec, &mut confirm));
    }

    for result in self.analyzer(&mut confirm) {
      report.record(result);
    }

    info!(summary = %report.summary(), "full setup finished");
  }
}
