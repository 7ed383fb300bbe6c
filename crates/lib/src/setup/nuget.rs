//! NuGet package installation through the bridge package's
//! `Assets/packages.config`.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <packages>
//!   <package id="R3" version="1.2.9" manuallyInstalled="true" />
//! </packages>
//! ```
//!
//! The bridge restores declared packages the next time the host loads.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::ASSETS_DIR;
use crate::manifest::read_installed_state;

const PACKAGES_CONFIG: &str = "packages.config";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

#[derive(Debug, Error)]
pub enum NugetError {
  #[error("the NuGet bridge package is not installed")]
  Unavailable,

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
    source: quick_xml::DeError,
  },

  #[error("failed to serialize packages.config: {0}")]
  Serialize(#[source] quick_xml::SeError),

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// What an install call changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NugetChange {
  Added,
  Updated,
  Unchanged,
}

pub trait NugetInstaller {
  /// Whether the bridge package is present and able to restore packages.
  fn is_available(&self) -> bool;

  fn install_package(&mut self, id: &str, version: &str) -> Result<NugetChange, NugetError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "packages")]
struct PackagesConfig {
  #[serde(rename = "package", default)]
  packages: Vec<PackageEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PackageEntry {
  #[serde(rename = "@id")]
  id: String,
  #[serde(rename = "@version")]
  version: String,
  #[serde(rename = "@manuallyInstalled", default, skip_serializing_if = "Option::is_none")]
  manually_installed: Option<bool>,
}

/// Declares packages in `Assets/packages.config`.
#[derive(Debug, Clone)]
pub struct PackagesConfigInstaller {
  project_root: PathBuf,
  bridge_marker: String,
}

impl PackagesConfigInstaller {
  pub fn new(project_root: PathBuf, bridge_marker: String) -> Self {
    Self {
      project_root,
      bridge_marker,
    }
  }

  pub fn config_path(&self) -> PathBuf {
    self.project_root.join(ASSETS_DIR).join(PACKAGES_CONFIG)
  }

  fn load(&self, path: &Path) -> Result<PackagesConfig, NugetError> {
    let content = match fs::read_to_string(path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PackagesConfig::default()),
      Err(source) => {
        return Err(NugetError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };
    quick_xml::de::from_str(&content).map_err(|source| NugetError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  fn save(&self, path: &Path, config: &PackagesConfig) -> Result<(), NugetError> {
    let body = quick_xml::se::to_string(config).map_err(NugetError::Serialize)?;
    let write_err = |source| NugetError::Write {
      path: path.to_path_buf(),
      source,
    };
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, format!("{}{}\n", XML_DECLARATION, body)).map_err(write_err)
  }
}

impl NugetInstaller for PackagesConfigInstaller {
  fn is_available(&self) -> bool {
    read_installed_state(&self.project_root).mentions(&self.bridge_marker)
  }

  fn install_package(&mut self, id: &str, version: &str) -> Result<NugetChange, NugetError> {
    if !self.is_available() {
      return Err(NugetError::Unavailable);
    }

    let path = self.config_path();
    let mut config = self.load(&path)?;

    let change = match config.packages.iter_mut().find(|p| p.id == id) {
      Some(existing) if existing.version == version => NugetChange::Unchanged,
      Some(existing) => {
        debug!(package = %id, from = %existing.version, to = %version, "updating NuGet package version");
        existing.version = version.to_string();
        NugetChange::Updated
      }
      None => {
        config.packages.push(PackageEntry {
          id: id.to_string(),
          version: version.to_string(),
          manually_installed: Some(true),
        });
        NugetChange::Added
      }
    };

    if change != NugetChange::Unchanged {
      self.save(&path, &config)?;
      info!(package = %id, version = %version, "declared NuGet package");
    }
    Ok(change)
  }
}
