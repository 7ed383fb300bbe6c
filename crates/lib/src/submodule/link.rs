//! Cross-platform directory links.
//!
//! - **Unix**: relative symlinks via `std::os::unix::fs::symlink`
//! - **Windows**: junctions via the `junction` crate, which need no elevated
//!   privileges but require an absolute target

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use crate::platform::Os;

#[derive(Debug, Error)]
pub enum LinkError {
  #[error("failed to create link '{}' -> '{}': {source}", link.display(), target.display())]
  Create {
    link: PathBuf,
    target: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("'{}' already exists and does not point to '{}'", link.display(), expected.display())]
  Conflict { link: PathBuf, expected: PathBuf },
}

/// Outcome of [`ensure_dir_link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
  Existing,
  Created,
}

/// The link target as written into a symlink at `link_dir/<link name>`,
/// pointing at `project_root/<name>`.
///
/// For a project-relative `link_dir` this is `../` once per component, then
/// the submodule name (e.g. `../../my-utils` from `Assets/Scripts`).
pub fn relative_target(link_dir: &Path, name: &str) -> PathBuf {
  if link_dir.is_absolute() {
    return link_dir.join(name);
  }
  let depth = link_dir
    .components()
    .filter(|c| matches!(c, Component::Normal(_)))
    .count();
  let mut target = PathBuf::new();
  for _ in 0..depth {
    target.push("..");
  }
  target.push(name);
  target
}

/// Read the target of a directory link (symlink) on Unix.
#[cfg(unix)]
pub fn read_dir_link(link: &Path) -> Option<PathBuf> {
  fs::read_link(link).ok()
}

/// Read the target of a directory link (symlink or junction) on Windows.
#[cfg(windows)]
pub fn read_dir_link(link: &Path) -> Option<PathBuf> {
  if let Ok(target) = fs::read_link(link) {
    return Some(target);
  }
  junction::get_target(link).ok()
}

/// Whether `link` is a link that resolves to `expected`.
///
/// Relative targets are resolved against the link's parent. When both sides
/// exist they are compared canonically, otherwise lexically.
pub fn points_to(link: &Path, expected: &Path) -> bool {
  let Some(target) = read_dir_link(link) else {
    return false;
  };
  let resolved = match (target.is_relative(), link.parent()) {
    (true, Some(parent)) => parent.join(&target),
    _ => target,
  };

  match (dunce::canonicalize(&resolved), dunce::canonicalize(expected)) {
    (Ok(a), Ok(b)) => a == b,
    _ => normalize(&resolved) == normalize(expected),
  }
}

fn normalize(path: &Path) -> PathBuf {
  let mut out = PathBuf::new();
  for component in path.components() {
    match component {
      Component::ParentDir => {
        out.pop();
      }
      Component::CurDir => {}
      other => out.push(other),
    }
  }
  out
}

/// Make sure `link` points at `target_abs`, creating it if absent.
///
/// `relative` is the symlink text used on Unix. An existing path that points
/// elsewhere, or is a real directory, is a [`LinkError::Conflict`].
pub fn ensure_dir_link(link: &Path, target_abs: &Path, relative: &Path) -> Result<LinkStatus, LinkError> {
  if link.symlink_metadata().is_ok() {
    if points_to(link, target_abs) {
      trace!(link = %link.display(), "link already exists");
      return Ok(LinkStatus::Existing);
    }
    return Err(LinkError::Conflict {
      link: link.to_path_buf(),
      expected: target_abs.to_path_buf(),
    });
  }

  if let Some(parent) = link.parent() {
    fs::create_dir_all(parent).map_err(|source| LinkError::Create {
      link: link.to_path_buf(),
      target: target_abs.to_path_buf(),
      source,
    })?;
  }

  create_dir_link(link, target_abs, relative)?;
  debug!(link = %link.display(), target = %target_abs.display(), "created directory link");
  Ok(LinkStatus::Created)
}

#[cfg(unix)]
fn create_dir_link(link: &Path, _target_abs: &Path, relative: &Path) -> Result<(), LinkError> {
  std::os::unix::fs::symlink(relative, link).map_err(|source| LinkError::Create {
    link: link.to_path_buf(),
    target: relative.to_path_buf(),
    source,
  })
}

#[cfg(windows)]
fn create_dir_link(link: &Path, target_abs: &Path, _relative: &Path) -> Result<(), LinkError> {
  junction::create(target_abs, link).map_err(|source| LinkError::Create {
    link: link.to_path_buf(),
    target: target_abs.to_path_buf(),
    source,
  })
}

/// The shell command a user can run to create the link by hand.
pub fn manual_link_command(os: Os, link: &Path, target_abs: &Path, relative: &Path) -> String {
  match os {
    Os::Windows => format!("mklink /J \"{}\" \"{}\"", link.display(), target_abs.display()),
    Os::Unix => format!("ln -s {} {}", relative.display(), link.display()),
  }
}
