use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::FileOpError;

/// Folders touched by [`create_folder_structure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderReport {
  pub created: Vec<PathBuf>,
  pub existing: Vec<PathBuf>,
}

/// Create every project-relative folder, including missing parents.
///
/// Existing folders are left alone, so running twice creates nothing the
/// second time.
pub fn create_folder_structure(project_root: &Path, folders: &[String]) -> Result<FolderReport, FileOpError> {
  let mut report = FolderReport::default();

  for folder in folders {
    let path = project_root.join(folder);
    if path.is_dir() {
      debug!(folder = %folder, "folder exists");
      report.existing.push(path);
      continue;
    }

    fs::create_dir_all(&path).map_err(|e| FileOpError::CreateDir {
      path: path.clone(),
      source: e,
    })?;
    debug!(folder = %folder, "created folder");
    report.created.push(path);
  }

  info!(
    created = report.created.len(),
    existing = report.existing.len(),
    "folder structure ready"
  );
  Ok(report)
}
