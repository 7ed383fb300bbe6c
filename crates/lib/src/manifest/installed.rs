//! The host's live dependency manifest.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::consts::HOST_MANIFEST_PATH;

/// Dependencies currently declared by the host project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstalledState {
  #[serde(default)]
  pub dependencies: BTreeMap<String, String>,
}

impl InstalledState {
  pub fn contains_key(&self, id: &str) -> bool {
    self.dependencies.contains_key(id)
  }

  /// Whether any installed key or value contains `needle`.
  pub fn mentions(&self, needle: &str) -> bool {
    self
      .dependencies
      .iter()
      .any(|(key, value)| key.contains(needle) || value.contains(needle))
  }
}

/// Read `Packages/manifest.json` under the project root.
///
/// A missing or unparseable manifest reads as empty, which makes the differ
/// queue everything; installing an already-present package is a no-op.
pub fn read_installed_state(project_root: &Path) -> InstalledState {
  let path = project_root.join(HOST_MANIFEST_PATH);

  let content = match fs::read_to_string(&path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return InstalledState::default(),
    Err(e) => {
      warn!(path = %path.display(), error = %e, "failed to read host manifest");
      return InstalledState::default();
    }
  };

  match serde_json::from_str(&content) {
    Ok(state) => state,
    Err(e) => {
      warn!(path = %path.display(), error = %e, "failed to parse host manifest");
      InstalledState::default()
    }
  }
}
