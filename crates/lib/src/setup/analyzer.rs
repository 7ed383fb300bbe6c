//! Analyzer build: compile the analyzer project with the external build tool
//! and copy the resulting DLLs into `Assets/Analyzers/`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::consts::ASSETS_DIR;
use crate::manifest::AnalyzerSpec;
use crate::process::{CommandRunner, ProcessError, display_command, path_arg, run_checked};

const ANALYZERS_DIR: &str = "Analyzers";

#[derive(Debug, Error)]
pub enum AnalyzerError {
  #[error("analyzer project not found: {}", path.display())]
  ProjectNotFound { path: PathBuf },

  #[error("analyzer build failed: {source}")]
  Build {
    #[source]
    source: ProcessError,
  },

  #[error("no {name}.dll produced under {}", dir.display())]
  NoOutput { name: String, dir: PathBuf },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl AnalyzerError {
  /// Manual-recovery hint.
  pub fn hint(&self) -> Option<String> {
    match self {
      AnalyzerError::ProjectNotFound { .. } => Some("check 'analyzers.projectPath' in template-manifest.json".to_string()),
      AnalyzerError::Build { source } => Some(source.command().to_string()),
      AnalyzerError::NoOutput { dir, .. } => Some(format!("copy the analyzer DLL from {} manually", dir.display())),
      AnalyzerError::Copy { .. } => None,
    }
  }
}

/// Build the analyzer and return the DLLs copied into `Assets/Analyzers/`.
pub fn build_analyzer(
  runner: &mut dyn CommandRunner,
  project_root: &Path,
  spec: &AnalyzerSpec,
  build_tool: &str,
) -> Result<Vec<PathBuf>, AnalyzerError> {
  let project = project_root.join(&spec.submodule_name).join(&spec.project_path);
  if !project.is_file() {
    return Err(AnalyzerError::ProjectNotFound { path: project });
  }

  let project_arg = path_arg(&project);
  let args = ["build", project_arg.as_str(), "-c", "Release"];
  info!(command = %display_command(build_tool, &args), "building analyzer");
  run_checked(runner, build_tool, &args, project_root).map_err(|source| AnalyzerError::Build { source })?;

  let stem = project
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_default();
  let dll_name = format!("{}.dll", stem);
  let output_dir = project.parent().unwrap_or(project_root).join("bin").join("Release");

  let dlls: Vec<PathBuf> = WalkDir::new(&output_dir)
    .sort_by_file_name()
    .into_iter()
    .filter_map(Result::ok)
    .filter(|e| e.file_type().is_file() && e.file_name().to_string_lossy() == dll_name)
    .map(|e| e.into_path())
    .collect();

  if dlls.is_empty() {
    return Err(AnalyzerError::NoOutput {
      name: stem,
      dir: output_dir,
    });
  }

  let target_dir = project_root.join(ASSETS_DIR).join(ANALYZERS_DIR);
  let mut copied = Vec::new();
  for from in dlls {
    let to = target_dir.join(&dll_name);
    fs::create_dir_all(&target_dir)
      .and_then(|_| fs::copy(&from, &to))
      .map_err(|source| AnalyzerError::Copy {
        from: from.clone(),
        to: to.clone(),
        source,
      })?;
    debug!(from = %from.display(), to = %to.display(), "copied analyzer");
    if !copied.contains(&to) {
      copied.push(to);
    }
  }

  info!(count = copied.len(), "analyzer installed");
  Ok(copied)
}
