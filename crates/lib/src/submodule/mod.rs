//! Git submodule provisioning.
//!
//! [`SubmoduleProvisioner::setup_submodule`] registers a submodule and links
//! it into the scripts directory. Every step is idempotent:
//!
//! 0. A link that already resolves to the checkout means nothing to do.
//! 1. A registered submodule is synced, updated and linked.
//! 2. An unregistered directory of the same name is deleted after
//!    confirmation, together with stale metadata under `.git/modules`.
//! 3. The submodule is added and initialized.
//! 4. The link is created.

pub mod link;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::confirm::Confirm;
use crate::manifest::SubmoduleSpec;
use crate::platform::Os;
use crate::process::{CommandRunner, ProcessError, display_command, run_checked};
use link::{LinkError, LinkStatus, ensure_dir_link, manual_link_command, points_to, relative_target};

const GITMODULES: &str = ".gitmodules";

#[derive(Debug, Error)]
pub enum SubmoduleError {
  #[error("git command failed: {source}")]
  Git {
    #[source]
    source: ProcessError,
  },

  #[error("failed to read {}: {source}", path.display())]
  ReadGitmodules {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to remove {}: {source}", path.display())]
  Remove {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("{source}")]
  Link {
    #[source]
    source: LinkError,
    manual: String,
  },
}

impl SubmoduleError {
  /// The equivalent shell command to run by hand.
  pub fn hint(&self) -> Option<String> {
    match self {
      SubmoduleError::Git { source } => Some(source.command().to_string()),
      SubmoduleError::Link { manual, .. } => Some(manual.clone()),
      SubmoduleError::Remove { path, .. } => Some(format!("rm -rf {}", path.display())),
      SubmoduleError::ReadGitmodules { .. } => None,
    }
  }
}

impl From<ProcessError> for SubmoduleError {
  fn from(source: ProcessError) -> Self {
    SubmoduleError::Git { source }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmoduleOutcome {
  /// The link already resolved to the checkout; no git operations ran.
  AlreadyLinked,
  /// The submodule was registered; it was synced, updated and linked.
  Updated,
  /// The submodule was added and linked.
  Added,
  /// The user declined to replace an existing directory.
  Declined,
}

pub struct SubmoduleProvisioner {
  project_root: PathBuf,
  scripts_dir: PathBuf,
  os: Os,
}

impl SubmoduleProvisioner {
  /// `scripts_dir` is relative to `project_root`.
  pub fn new(project_root: PathBuf, scripts_dir: PathBuf) -> Self {
    Self {
      project_root,
      scripts_dir,
      os: Os::current(),
    }
  }

  pub fn link_path(&self, spec: &SubmoduleSpec) -> PathBuf {
    self.project_root.join(&self.scripts_dir).join(&spec.link_name)
  }

  pub fn checkout_path(&self, spec: &SubmoduleSpec) -> PathBuf {
    self.project_root.join(&spec.name)
  }

  pub fn setup_submodule(
    &self,
    runner: &mut dyn CommandRunner,
    spec: &SubmoduleSpec,
    confirm: &mut dyn Confirm,
  ) -> Result<SubmoduleOutcome, SubmoduleError> {
    let link = self.link_path(spec);
    let checkout = self.checkout_path(spec);

    if points_to(&link, &checkout) {
      info!(submodule = %spec.name, link = %link.display(), "submodule already linked");
      return Ok(SubmoduleOutcome::AlreadyLinked);
    }

    let root = self.project_root.as_path();

    if self.is_registered(&spec.name)? {
      info!(submodule = %spec.name, "submodule registered, syncing");
      run_checked(runner, "git", &["submodule", "sync"], root)?;
      run_checked(runner, "git", &["submodule", "update", "--init", "--recursive"], root)?;
      self.ensure_link(spec)?;
      return Ok(SubmoduleOutcome::Updated);
    }

    if checkout.exists() {
      let prompt = format!(
        "'{}' already exists but is not a registered submodule. Delete it and add the submodule?",
        spec.name
      );
      if !confirm.confirm(&prompt) {
        info!(submodule = %spec.name, "replacement declined");
        return Ok(SubmoduleOutcome::Declined);
      }
      remove_dir(&checkout)?;
    }

    let stale = root.join(".git").join("modules").join(&spec.name);
    if stale.exists() {
      warn!(path = %stale.display(), "purging stale submodule metadata");
      remove_dir(&stale)?;
    }

    info!(submodule = %spec.name, url = %spec.url, "adding submodule");
    run_checked(runner, "git", &["submodule", "add", &spec.url, &spec.name], root)?;
    run_checked(runner, "git", &["submodule", "update", "--init", "--recursive"], root)?;
    self.ensure_link(spec)?;
    Ok(SubmoduleOutcome::Added)
  }

  /// Whether `.gitmodules` declares a submodule named `name`.
  pub fn is_registered(&self, name: &str) -> Result<bool, SubmoduleError> {
    let path = self.project_root.join(GITMODULES);
    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
      Err(source) => return Err(SubmoduleError::ReadGitmodules { path, source }),
    };
    Ok(content.contains(&format!("[submodule \"{}\"]", name)))
  }

  fn ensure_link(&self, spec: &SubmoduleSpec) -> Result<LinkStatus, SubmoduleError> {
    let link = self.link_path(spec);
    let checkout = self.checkout_path(spec);
    let relative = relative_target(&self.scripts_dir, &spec.name);
    debug!(kind = self.os.link_kind(), link = %link.display(), "ensuring directory link");

    ensure_dir_link(&link, &checkout, &relative).map_err(|source| SubmoduleError::Link {
      source,
      manual: manual_link_command(self.os, &self.scripts_dir.join(&spec.link_name), &checkout, &relative),
    })
  }

  /// Manual commands equivalent to a full `setup_submodule` run.
  pub fn manual_steps(&self, spec: &SubmoduleSpec) -> Vec<String> {
    let relative = relative_target(&self.scripts_dir, &spec.name);
    vec![
      display_command("git", &["submodule", "add", &spec.url, &spec.name]),
      display_command("git", &["submodule", "update", "--init", "--recursive"]),
      manual_link_command(
        self.os,
        &self.scripts_dir.join(&spec.link_name),
        &self.checkout_path(spec),
        &relative,
      ),
    ]
  }
}

fn remove_dir(path: &Path) -> Result<(), SubmoduleError> {
  fs::remove_dir_all(path).map_err(|source| SubmoduleError::Remove {
    path: path.to_path_buf(),
    source,
  })
}
