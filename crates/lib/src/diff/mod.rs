//! Desired-state differ.
//!
//! Computes which declared packages are missing from the host manifest. The
//! check is a flat membership test; no version resolution takes place.

mod canonical;

pub use canonical::{canonical_git_identity, same_git_package};

use tracing::{debug, trace};

use crate::host::HostEnvironment;
use crate::manifest::{DesiredManifest, InstalledState};

/// Packages the host runtime ships as built-ins from a given major version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinPolicy {
  pub packages: Vec<String>,
  pub min_major: u32,
}

impl Default for BuiltinPolicy {
  fn default() -> Self {
    Self {
      packages: vec!["com.unity.textmeshpro".to_string(), "com.unity.ugui".to_string()],
      min_major: 6,
    }
  }
}

impl BuiltinPolicy {
  /// Whether `version` is at or above the built-in threshold.
  ///
  /// Versions are either `<major>.<minor>...` or the year-style
  /// `<major>000.<minor>...`, so a prefix match on the major number or a
  /// lexicographic comparison against `<major>000` covers both.
  pub fn version_qualifies(&self, version: &str) -> bool {
    let major = self.min_major.to_string();
    version.starts_with(&major) || version >= format!("{}000", major).as_str()
  }

  /// Whether `id` is built in for the given environment.
  pub fn is_builtin(&self, id: &str, env: &HostEnvironment) -> bool {
    let qualifies = env
      .editor_version
      .as_deref()
      .is_some_and(|v| self.version_qualifies(v));
    qualifies && self.packages.iter().any(|p| p == id)
  }
}

/// Returns the ordered list of identifiers to install.
///
/// Registry packages come first in declaration order, then git packages in
/// declaration order.
pub fn packages_to_install(
  desired: &DesiredManifest,
  installed: &InstalledState,
  env: &HostEnvironment,
  builtins: &BuiltinPolicy,
) -> Vec<String> {
  let mut result = Vec::new();

  for id in &desired.packages {
    if builtins.is_builtin(id, env) {
      trace!(package = %id, "skipping built-in package");
      continue;
    }
    if installed.contains_key(id) {
      trace!(package = %id, "package already installed");
      continue;
    }
    result.push(id.clone());
  }

  for url in &desired.git_packages {
    if git_package_installed(url, installed) {
      trace!(package = %url, "git package already installed");
      continue;
    }
    result.push(url.clone());
  }

  debug!(count = result.len(), "computed packages to install");
  result
}

fn git_package_installed(url: &str, installed: &InstalledState) -> bool {
  let identity = canonical_git_identity(url);
  installed.dependencies.iter().any(|(key, value)| {
    [key, value]
      .into_iter()
      .any(|s| s.contains("github.com") && canonical_git_identity(s) == identity)
  })
}
