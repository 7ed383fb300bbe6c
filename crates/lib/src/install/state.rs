//! Persisted installation state.
//!
//! The host may tear the process down in the middle of a batch. Everything
//! needed to resume lives in a small preference store:
//!
//! ```text
//! {state_dir}/
//! └── prefs.json   # { "templar.installState": "<json>", "templar.fullSetupInProgress": true }
//! ```
//!
//! The install-state blob is always written whole, never patched.

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::{PREF_KEY_FULL_SETUP, PREF_KEY_INSTALL_STATE};

/// Preference file name within the state directory.
const PREFS_FILENAME: &str = "prefs.json";

#[derive(Debug, Error)]
pub enum StateError {
  #[error("failed to create state directory {}: {source}", path.display())]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to write {}: {source}", path.display())]
  Write {
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

  #[error("preference '{key}' is corrupt: {source}")]
  Corrupt {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to serialize state: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Key/value preference storage that outlives the process.
pub trait PrefStore {
  fn get_string(&self, key: &str) -> Result<Option<String>, StateError>;
  fn set_string(&self, key: &str, value: &str) -> Result<(), StateError>;
  fn get_bool(&self, key: &str) -> Result<bool, StateError>;
  fn set_bool(&self, key: &str, value: bool) -> Result<(), StateError>;
  fn delete(&self, key: &str) -> Result<(), StateError>;
}

/// Preferences stored as one JSON object on disk.
#[derive(Debug, Clone)]
pub struct FilePrefStore {
  dir: PathBuf,
}

impl FilePrefStore {
  pub fn new(dir: PathBuf) -> Self {
    Self { dir }
  }

  pub fn path(&self) -> PathBuf {
    self.dir.join(PREFS_FILENAME)
  }

  fn load(&self) -> Result<Map<String, Value>, StateError> {
    let path = self.path();
    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
      Err(source) => return Err(StateError::Read { path, source }),
    };
    serde_json::from_str(&content).map_err(|source| StateError::Parse { path, source })
  }

  /// Write atomically: temp file, then rename.
  fn save(&self, prefs: &Map<String, Value>) -> Result<(), StateError> {
    fs::create_dir_all(&self.dir).map_err(|source| StateError::CreateDir {
      path: self.dir.clone(),
      source,
    })?;

    let path = self.path();
    let temp_path = self.dir.join(format!("{}.tmp", PREFS_FILENAME));

    let content = serde_json::to_string_pretty(prefs).map_err(StateError::Serialize)?;
    fs::write(&temp_path, &content).map_err(|source| StateError::Write {
      path: temp_path.clone(),
      source,
    })?;
    fs::rename(&temp_path, &path).map_err(|source| StateError::Write { path, source })
  }

  fn update(&self, f: impl FnOnce(&mut Map<String, Value>)) -> Result<(), StateError> {
    let mut prefs = self.load()?;
    f(&mut prefs);
    self.save(&prefs)
  }
}

impl PrefStore for FilePrefStore {
  fn get_string(&self, key: &str) -> Result<Option<String>, StateError> {
    Ok(self.load()?.get(key).and_then(Value::as_str).map(str::to_string))
  }

  fn set_string(&self, key: &str, value: &str) -> Result<(), StateError> {
    self.update(|prefs| {
      prefs.insert(key.to_string(), Value::String(value.to_string()));
    })
  }

  fn get_bool(&self, key: &str) -> Result<bool, StateError> {
    Ok(self.load()?.get(key).and_then(Value::as_bool).unwrap_or(false))
  }

  fn set_bool(&self, key: &str, value: bool) -> Result<(), StateError> {
    self.update(|prefs| {
      prefs.insert(key.to_string(), Value::Bool(value));
    })
  }

  fn delete(&self, key: &str) -> Result<(), StateError> {
    let mut prefs = self.load()?;
    if prefs.remove(key).is_some() {
      self.save(&prefs)?;
    }
    Ok(())
  }
}

/// In-memory preferences. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrefStore {
  values: Rc<RefCell<Map<String, Value>>>,
}

impl MemoryPrefStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn contains(&self, key: &str) -> bool {
    self.values.borrow().contains_key(key)
  }
}

impl PrefStore for MemoryPrefStore {
  fn get_string(&self, key: &str) -> Result<Option<String>, StateError> {
    Ok(self.values.borrow().get(key).and_then(Value::as_str).map(str::to_string))
  }

  fn set_string(&self, key: &str, value: &str) -> Result<(), StateError> {
    self
      .values
      .borrow_mut()
      .insert(key.to_string(), Value::String(value.to_string()));
    Ok(())
  }

  fn get_bool(&self, key: &str) -> Result<bool, StateError> {
    Ok(self.values.borrow().get(key).and_then(Value::as_bool).unwrap_or(false))
  }

  fn set_bool(&self, key: &str, value: bool) -> Result<(), StateError> {
    self.values.borrow_mut().insert(key.to_string(), Value::Bool(value));
    Ok(())
  }

  fn delete(&self, key: &str) -> Result<(), StateError> {
    self.values.borrow_mut().remove(key);
    Ok(())
  }
}

/// Snapshot of an in-progress batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationState {
  /// Identifiers not yet confirmed installed, front first.
  pub remaining_packages: Vec<String>,
  pub is_installing: bool,
  pub total_packages: usize,
  #[serde(default)]
  pub skipped_packages: usize,
}

/// Typed access to the install-state blob and the Full Setup flag.
pub struct InstallStateStore {
  prefs: Box<dyn PrefStore>,
}

impl InstallStateStore {
  pub fn new(prefs: Box<dyn PrefStore>) -> Self {
    Self { prefs }
  }

  pub fn save(&self, state: &InstallationState) -> Result<(), StateError> {
    let json = serde_json::to_string(state).map_err(StateError::Serialize)?;
    self.prefs.set_string(PREF_KEY_INSTALL_STATE, &json)?;
    debug!(
      remaining = state.remaining_packages.len(),
      total = state.total_packages,
      "saved installation state"
    );
    Ok(())
  }

  /// Load the snapshot, or `None` if none is stored.
  ///
  /// A blob that no longer parses is an error; callers decide whether to
  /// clear it.
  pub fn load(&self) -> Result<Option<InstallationState>, StateError> {
    let Some(json) = self.prefs.get_string(PREF_KEY_INSTALL_STATE)? else {
      return Ok(None);
    };
    serde_json::from_str(&json)
      .map(Some)
      .map_err(|source| StateError::Corrupt {
        key: PREF_KEY_INSTALL_STATE.to_string(),
        source,
      })
  }

  pub fn clear(&self) -> Result<(), StateError> {
    self.prefs.delete(PREF_KEY_INSTALL_STATE)
  }

  pub fn full_setup_in_progress(&self) -> Result<bool, StateError> {
    self.prefs.get_bool(PREF_KEY_FULL_SETUP)
  }

  pub fn set_full_setup_in_progress(&self, value: bool) -> Result<(), StateError> {
    if value {
      self.prefs.set_bool(PREF_KEY_FULL_SETUP, true)
    } else {
      self.prefs.delete(PREF_KEY_FULL_SETUP)
    }
  }

  /// Clear the Full Setup flag, logging instead of failing.
  pub fn reset_full_setup(&self) {
    if let Err(e) = self.set_full_setup_in_progress(false) {
      warn!(error = %e, "failed to clear full setup flag");
    }
  }
}
