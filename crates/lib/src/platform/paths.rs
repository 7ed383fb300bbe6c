use std::path::{Path, PathBuf};

use crate::consts::APP_NAME;

/// Environment variable overriding the project root.
pub const PROJECT_ENV: &str = "TEMPLAR_PROJECT";

/// Environment variable overriding the preference store directory.
pub const STATE_DIR_ENV: &str = "TEMPLAR_STATE_DIR";

/// Resolve the host project root.
///
/// Priority order:
/// 1. Explicit path (e.g. from `--project`)
/// 2. `TEMPLAR_PROJECT`
/// 3. The current working directory
pub fn project_root(explicit: Option<&Path>) -> std::io::Result<PathBuf> {
  let root = match explicit {
    Some(path) => path.to_path_buf(),
    None => match std::env::var_os(PROJECT_ENV) {
      Some(path) => PathBuf::from(path),
      None => std::env::current_dir()?,
    },
  };
  Ok(dunce::canonicalize(&root).unwrap_or(root))
}

/// Returns the directory holding persisted preferences for a project.
///
/// Defaults to `<project>/Library/templar`, the host's per-project cache
/// directory, which survives editor reloads but is never committed.
pub fn state_dir(project_root: &Path) -> PathBuf {
  match std::env::var_os(STATE_DIR_ENV) {
    Some(dir) => PathBuf::from(dir),
    None => project_root.join("Library").join(APP_NAME),
  }
}
