use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::DesiredManifest;
use crate::consts::TEMPLATE_MANIFEST_FILENAME;
use crate::host::AssetIndex;

#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("template directory not found (looked for template-manifest.json)")]
  TemplateNotFound,

  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Read and parse the desired-state manifest inside a template directory.
pub fn read_desired_manifest(template_dir: &Path) -> Result<DesiredManifest, ManifestError> {
  let path = template_dir.join(TEMPLATE_MANIFEST_FILENAME);
  let content = fs::read_to_string(&path).map_err(|source| ManifestError::Read {
    path: path.clone(),
    source,
  })?;
  serde_json::from_str(&content).map_err(|source| ManifestError::Parse { path, source })
}

/// Load the desired-state manifest, falling back to the built-in template.
///
/// Never fails: a missing template directory, an unreadable file or a parse
/// error is logged and [`DesiredManifest::default_template`] is returned.
pub fn load_desired_manifest(index: &dyn AssetIndex) -> DesiredManifest {
  let result = index
    .find_template_dir()
    .ok_or(ManifestError::TemplateNotFound)
    .and_then(|dir| read_desired_manifest(&dir));

  match result {
    Ok(manifest) => {
      debug!(
        packages = manifest.packages.len(),
        git_packages = manifest.git_packages.len(),
        "loaded desired manifest"
      );
      manifest
    }
    Err(e) => {
      warn!(error = %e, "using built-in template manifest");
      DesiredManifest::default_template()
    }
  }
}
