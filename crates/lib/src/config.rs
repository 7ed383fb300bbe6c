//! Per-project configuration.
//!
//! Read from `templar.json` in the project root. Every key is optional; a
//! missing file yields [`TemplarConfig::default`].
//!
//! ```json
//! {
//!   "scriptsDir": "Assets/Scripts",
//!   "tickIntervalMs": 50,
//!   "successDelayMs": 500,
//!   "buildTool": "dotnet",
//!   "failurePatterns": ["Cannot find a version"]
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{CONFIG_FILENAME, DEFAULT_BRIDGE_MARKER};
use crate::install::policy::DEFAULT_SKIP_PATTERNS;

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplarConfig {
  /// Explicit template directory; located through the asset index when unset.
  pub template_dir: Option<PathBuf>,
  /// Project-relative directory that receives submodule links.
  pub scripts_dir: PathBuf,
  /// Interval between scheduler ticks.
  pub tick_interval_ms: u64,
  /// Pause after each successful install before the next dispatch.
  pub success_delay_ms: u64,
  /// External build tool used for the analyzer project.
  pub build_tool: String,
  /// Failure-message substrings that mark an install as skippable.
  pub failure_patterns: Vec<String>,
  /// Packages absorbed into the host runtime as built-ins.
  pub builtin_packages: Vec<String>,
  /// Host runtime major version from which `builtin_packages` are built in.
  pub builtin_min_major: u32,
  /// Identifier substring of the bridge package that must install first.
  pub bridge_marker: String,
}

impl Default for TemplarConfig {
  fn default() -> Self {
    Self {
      template_dir: None,
      scripts_dir: PathBuf::from("Assets").join("Scripts"),
      tick_interval_ms: 50,
      success_delay_ms: 500,
      build_tool: "dotnet".to_string(),
      failure_patterns: DEFAULT_SKIP_PATTERNS.iter().map(|s| s.to_string()).collect(),
      builtin_packages: vec!["com.unity.textmeshpro".to_string(), "com.unity.ugui".to_string()],
      builtin_min_major: 6,
      bridge_marker: DEFAULT_BRIDGE_MARKER.to_string(),
    }
  }
}

impl TemplarConfig {
  /// Load `templar.json` from the project root.
  pub fn load(project_root: &Path) -> Result<Self, ConfigError> {
    let path = project_root.join(CONFIG_FILENAME);

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Self::default());
      }
      Err(source) => return Err(ConfigError::Read { path, source }),
    };

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
  }

  pub fn tick_interval(&self) -> Duration {
    Duration::from_millis(self.tick_interval_ms.max(1))
  }

  /// The post-success delay expressed in scheduler ticks (rounded up).
  pub fn success_delay_ticks(&self) -> u32 {
    let tick = self.tick_interval_ms.max(1);
    self.success_delay_ms.div_ceil(tick).min(u32::MAX as u64) as u32
  }
}
