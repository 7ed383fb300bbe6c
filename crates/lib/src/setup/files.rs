//! Template file copies: config files, license assets and script templates.
//!
//! Template layout:
//!
//! ```text
//! {template_dir}/
//! ├── template-manifest.json
//! ├── ConfigTemplates/      # copied by copy_config_files (overwrite)
//! ├── LicenseTemplates/     # *.asset, copied by copy_license_files (if absent)
//! └── ScriptTemplates/      # *.template, copied by copy_script_templates (if absent)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::FileOpError;
use crate::consts::ASSETS_DIR;
use crate::manifest::{ConfigDestination, ConfigFileEntry};

const CONFIG_TEMPLATES_DIR: &str = "ConfigTemplates";
const SCRIPT_TEMPLATES_DIR: &str = "ScriptTemplates";
const SCRIPT_TEMPLATE_SUFFIX: &str = ".template";
const LICENSE_TARGET_DIR: &str = "LicenseMaster";

/// Script templates that only make sense inside the editor assembly.
const EDITOR_SCRIPT_NAMES: &[&str] = &["SceneSwitchLeftButton", "CreateTutorialScenes"];

#[derive(Debug, Default)]
pub struct CopyReport {
  pub copied: Vec<PathBuf>,
  /// Destinations left untouched because they already existed.
  pub kept: Vec<PathBuf>,
  /// Per-entry failures; sibling entries are still attempted.
  pub failed: Vec<(String, FileOpError)>,
}

impl CopyReport {
  pub fn is_ok(&self) -> bool {
    self.failed.is_empty()
  }
}

fn copy_file(from: &Path, to: &Path) -> Result<(), FileOpError> {
  if let Some(parent) = to.parent() {
    fs::create_dir_all(parent).map_err(|e| FileOpError::CreateDir {
      path: parent.to_path_buf(),
      source: e,
    })?;
  }
  fs::copy(from, to).map_err(|e| FileOpError::Copy {
    from: from.to_path_buf(),
    to: to.to_path_buf(),
    source: e,
  })?;
  Ok(())
}

fn list_files(dir: &Path, suffix: &str) -> Result<Vec<PathBuf>, FileOpError> {
  let entries = fs::read_dir(dir).map_err(|e| FileOpError::ReadDir {
    path: dir.to_path_buf(),
    source: e,
  })?;

  let mut files = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|e| FileOpError::ReadDir {
      path: dir.to_path_buf(),
      source: e,
    })?;
    let path = entry.path();
    if path.is_file() && path.file_name().is_some_and(|n| n.to_string_lossy().ends_with(suffix)) {
      files.push(path);
    }
  }
  files.sort();
  Ok(files)
}

/// Copy declared config files from `ConfigTemplates/`, overwriting existing
/// files without asking.
pub fn copy_config_files(template_dir: &Path, project_root: &Path, entries: &[ConfigFileEntry]) -> CopyReport {
  let mut report = CopyReport::default();
  let source_dir = template_dir.join(CONFIG_TEMPLATES_DIR);

  for entry in entries {
    let from = source_dir.join(&entry.source);
    let to = match entry.destination {
      ConfigDestination::ProjectRoot => project_root.join(&entry.source),
      ConfigDestination::Assets => project_root.join(ASSETS_DIR).join(&entry.source),
    };

    if !from.is_file() {
      warn!(source = %from.display(), "config template missing");
      report
        .failed
        .push((entry.source.clone(), FileOpError::MissingSource { path: from }));
      continue;
    }

    match copy_file(&from, &to) {
      Ok(()) => {
        debug!(file = %entry.source, dest = %to.display(), "copied config file");
        report.copied.push(to);
      }
      Err(e) => {
        warn!(file = %entry.source, error = %e, "failed to copy config file");
        report.failed.push((entry.source.clone(), e));
      }
    }
  }

  info!(copied = report.copied.len(), failed = report.failed.len(), "config files copied");
  report
}

/// Copy every `*.asset` license file into `Assets/LicenseMaster/`, keeping
/// files that already exist.
pub fn copy_license_files(template_dir: &Path, project_root: &Path, folder: &str) -> Result<CopyReport, FileOpError> {
  let source_dir = template_dir.join(folder);
  if !source_dir.is_dir() {
    return Err(FileOpError::MissingSource { path: source_dir });
  }

  let target_dir = project_root.join(ASSETS_DIR).join(LICENSE_TARGET_DIR);
  let mut report = CopyReport::default();

  for from in list_files(&source_dir, ".asset")? {
    let Some(name) = from.file_name() else { continue };
    let to = target_dir.join(name);
    if to.exists() {
      report.kept.push(to);
      continue;
    }
    match copy_file(&from, &to) {
      Ok(()) => report.copied.push(to),
      Err(e) => report.failed.push((name.to_string_lossy().into_owned(), e)),
    }
  }

  info!(copied = report.copied.len(), kept = report.kept.len(), "license files copied");
  Ok(report)
}

/// Which script templates to copy, by file-name substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptFilter {
  /// When non-empty, only names containing one of these are copied.
  pub include: Vec<String>,
  pub exclude: Vec<String>,
}

impl ScriptFilter {
  pub fn matches(&self, name: &str) -> bool {
    let included = self.include.is_empty() || self.include.iter().any(|p| name.contains(p.as_str()));
    included && !self.exclude.iter().any(|p| name.contains(p.as_str()))
  }
}

/// The two script-template targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPreset {
  /// Runtime utilities into `Assets/Scripts/Utils`.
  Utility,
  /// Editor-only scripts into `Assets/Editor`.
  Editor,
}

impl ScriptPreset {
  pub fn target(&self) -> PathBuf {
    match self {
      ScriptPreset::Utility => Path::new(ASSETS_DIR).join("Scripts").join("Utils"),
      ScriptPreset::Editor => Path::new(ASSETS_DIR).join("Editor"),
    }
  }

  pub fn filter(&self) -> ScriptFilter {
    let names = EDITOR_SCRIPT_NAMES.iter().map(|s| s.to_string()).collect();
    match self {
      ScriptPreset::Utility => ScriptFilter {
        include: Vec::new(),
        exclude: names,
      },
      ScriptPreset::Editor => ScriptFilter {
        include: names,
        exclude: Vec::new(),
      },
    }
  }
}

/// Copy `ScriptTemplates/*.template` into `target` (project-relative) with the
/// suffix stripped. Existing scripts are kept.
///
/// A template directory without `ScriptTemplates/` copies nothing.
pub fn copy_script_templates(
  template_dir: &Path,
  project_root: &Path,
  target: &Path,
  filter: &ScriptFilter,
) -> Result<CopyReport, FileOpError> {
  let source_dir = template_dir.join(SCRIPT_TEMPLATES_DIR);
  let mut report = CopyReport::default();
  if !source_dir.is_dir() {
    debug!(dir = %source_dir.display(), "no script templates");
    return Ok(report);
  }

  let target_dir = project_root.join(target);
  fs::create_dir_all(&target_dir).map_err(|e| FileOpError::CreateDir {
    path: target_dir.clone(),
    source: e,
  })?;

  for from in list_files(&source_dir, SCRIPT_TEMPLATE_SUFFIX)? {
    let Some(file_name) = from.file_name().map(|n| n.to_string_lossy().into_owned()) else {
      continue;
    };
    let name = file_name.trim_end_matches(SCRIPT_TEMPLATE_SUFFIX);
    if !filter.matches(name) {
      continue;
    }

    let to = target_dir.join(name);
    if to.exists() {
      report.kept.push(to);
      continue;
    }
    match copy_file(&from, &to) {
      Ok(()) => {
        debug!(template = %file_name, script = %name, "copied script template");
        report.copied.push(to);
      }
      Err(e) => report.failed.push((file_name.clone(), e)),
    }
  }

  info!(target = %target.display(), copied = report.copied.len(), "script templates copied");
  Ok(report)
}
