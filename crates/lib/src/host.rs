//! Host project environment.
//!
//! Detects the editor version of the host project and locates the bundled
//! template directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::consts::{ASSETS_DIR, PROJECT_VERSION_PATH, TEMPLATE_MANIFEST_FILENAME};

/// Maximum directory depth searched for the template marker file.
const TEMPLATE_SEARCH_DEPTH: usize = 6;

/// Facts about the host project relevant to diffing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnvironment {
  /// Editor version such as `6000.0.23f1`; `None` when undetectable.
  pub editor_version: Option<String>,
}

impl HostEnvironment {
  /// Read `m_EditorVersion` from `ProjectSettings/ProjectVersion.txt`.
  pub fn detect(project_root: &Path) -> Self {
    let path = project_root.join(PROJECT_VERSION_PATH);
    let editor_version = match fs::read_to_string(&path) {
      Ok(content) => parse_editor_version(&content),
      Err(e) => {
        debug!(path = %path.display(), error = %e, "editor version unavailable");
        None
      }
    };
    Self { editor_version }
  }
}

fn parse_editor_version(content: &str) -> Option<String> {
  content.lines().find_map(|line| {
    line
      .strip_prefix("m_EditorVersion:")
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty())
  })
}

/// The host's asset database.
pub trait AssetIndex {
  /// Ask the host to pick up files written outside its own APIs.
  fn refresh(&self);

  /// Directory holding the bundled `template-manifest.json`.
  fn find_template_dir(&self) -> Option<PathBuf>;
}

/// Filesystem-backed asset index.
///
/// There is no live host process to notify, so `refresh` only records a
/// trace event.
#[derive(Debug, Clone)]
pub struct FsAssetIndex {
  project_root: PathBuf,
  template_dir: Option<PathBuf>,
}

impl FsAssetIndex {
  pub fn new(project_root: PathBuf, template_dir: Option<PathBuf>) -> Self {
    Self {
      project_root,
      template_dir,
    }
  }
}

impl AssetIndex for FsAssetIndex {
  fn refresh(&self) {
    trace!(root = %self.project_root.display(), "asset index refresh");
  }

  fn find_template_dir(&self) -> Option<PathBuf> {
    if let Some(dir) = &self.template_dir {
      let dir = if dir.is_relative() {
        self.project_root.join(dir)
      } else {
        dir.clone()
      };
      if dir.join(TEMPLATE_MANIFEST_FILENAME).is_file() {
        return Some(dir);
      }
      warn!(dir = %dir.display(), "configured template directory has no manifest");
      return None;
    }

    for base in ["Packages", ASSETS_DIR] {
      let base = self.project_root.join(base);
      if !base.is_dir() {
        continue;
      }
      let found = WalkDir::new(&base)
        .max_depth(TEMPLATE_SEARCH_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|entry| entry.file_type().is_file() && entry.file_name() == TEMPLATE_MANIFEST_FILENAME);

      if let Some(entry) = found
        && let Some(parent) = entry.path().parent()
      {
        debug!(dir = %parent.display(), "found template directory");
        return Some(parent.to_path_buf());
      }
    }

    None
  }
}
