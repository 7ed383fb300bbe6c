//! Project setup phases and the Full Setup orchestrator.

pub mod analyzer;
pub mod files;
pub mod folders;
pub mod nuget;
pub mod orchestrator;
pub mod report;

use std::path::PathBuf;

use thiserror::Error;

pub use analyzer::{AnalyzerError, build_analyzer};
pub use files::{CopyReport, ScriptFilter, ScriptPreset, copy_config_files, copy_license_files, copy_script_templates};
pub use folders::{FolderReport, create_folder_structure};
pub use nuget::{NugetChange, NugetError, NugetInstaller, PackagesConfigInstaller};
pub use orchestrator::{FullSetupGuard, SetupPhases, folders_phase};
pub use report::{PhaseResult, PhaseStatus, SetupReport, SetupSummary};

/// Errors from file-copy and folder phases.
#[derive(Debug, Error)]
pub enum FileOpError {
  #[error("source not found: {}", path.display())]
  MissingSource { path: PathBuf },

  #[error("failed to create directory {}: {source}", path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read directory {}: {source}", path.display())]
  ReadDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to copy {} to {}: {source}", from.display(), to.display())]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: std::io::Error,
  },
}
