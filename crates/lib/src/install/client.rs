//! Package-registry client.
//!
//! Requests are asynchronous: [`PackageClient::add`] returns immediately with
//! a handle that the scheduler polls once per tick.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, info};

use crate::consts::HOST_MANIFEST_PATH;

/// Placeholder version written for registry packages.
///
/// The editor's package manager only accepts semver here, so the manifest this
/// client produces is a declaration for tooling and tests, not one the editor
/// resolves as is.
const REGISTRY_VERSION: &str = "latest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus {
  Pending,
  Succeeded,
  Failed(String),
}

/// An in-flight add request.
pub trait AddRequest {
  /// Non-blocking status check.
  fn poll(&mut self) -> RequestStatus;
}

pub trait PackageClient {
  /// Start adding `id` (registry name or git URL).
  fn add(&mut self, id: &str) -> Box<dyn AddRequest>;
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("invalid package identifier '{0}'")]
  InvalidId(String),

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

  #[error("{} has no 'dependencies' object", path.display())]
  MissingDependencies { path: PathBuf },

  #[error("failed to write {}: {source}", path.display())]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Client that declares packages directly in `Packages/manifest.json`.
///
/// A declarative stand-in for the editor's package manager: it records intent
/// without resolving versions or fetching anything.
///
/// Each write runs on the blocking pool; its result is observed only through
/// [`AddRequest::poll`].
pub struct ManifestPackageClient {
  manifest_path: PathBuf,
  handle: Handle,
}

impl ManifestPackageClient {
  pub fn new(project_root: &Path, handle: Handle) -> Self {
    Self {
      manifest_path: project_root.join(HOST_MANIFEST_PATH),
      handle,
    }
  }
}

impl PackageClient for ManifestPackageClient {
  fn add(&mut self, id: &str) -> Box<dyn AddRequest> {
    let (tx, rx) = oneshot::channel();
    let path = self.manifest_path.clone();
    let id = id.to_string();

    self.handle.spawn_blocking(move || {
      let result = add_dependency(&path, &id).map_err(|e| e.to_string());
      // Receiver gone means the request was cancelled.
      let _ = tx.send(result);
    });

    Box::new(ManifestAddRequest { rx, status: None })
  }
}

struct ManifestAddRequest {
  rx: oneshot::Receiver<Result<(), String>>,
  status: Option<RequestStatus>,
}

impl AddRequest for ManifestAddRequest {
  fn poll(&mut self) -> RequestStatus {
    if let Some(status) = &self.status {
      return status.clone();
    }
    let status = match self.rx.try_recv() {
      Ok(Ok(())) => RequestStatus::Succeeded,
      Ok(Err(message)) => RequestStatus::Failed(message),
      Err(TryRecvError::Empty) => return RequestStatus::Pending,
      Err(TryRecvError::Closed) => RequestStatus::Failed("install task ended without a result".to_string()),
    };
    self.status = Some(status.clone());
    status
  }
}

fn is_git_id(id: &str) -> bool {
  id.starts_with("https://") || id.starts_with("git@") || id.starts_with("git+") || id.contains(".git")
}

fn is_registry_id(id: &str) -> bool {
  let mut chars = id.chars();
  chars.next().is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
    && id.contains('.')
    && id
      .chars()
      .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_'))
}

/// Declare `id` in the manifest at `manifest_path`, preserving other keys.
///
/// Already-declared identifiers are left untouched. Git identifiers are
/// recorded under their URL.
pub fn add_dependency(manifest_path: &Path, id: &str) -> Result<(), ClientError> {
  let value = if is_git_id(id) {
    id.to_string()
  } else if is_registry_id(id) {
    REGISTRY_VERSION.to_string()
  } else {
    return Err(ClientError::InvalidId(id.to_string()));
  };

  let mut root = match fs::read_to_string(manifest_path) {
    Ok(content) => serde_json::from_str::<Value>(&content).map_err(|source| ClientError::Parse {
      path: manifest_path.to_path_buf(),
      source,
    })?,
    Err(e) if e.kind() == io::ErrorKind::NotFound => Value::Object(Map::new()),
    Err(source) => {
      return Err(ClientError::Read {
        path: manifest_path.to_path_buf(),
        source,
      });
    }
  };

  let missing = || ClientError::MissingDependencies {
    path: manifest_path.to_path_buf(),
  };
  let dependencies = root
    .as_object_mut()
    .ok_or_else(missing)?
    .entry("dependencies")
    .or_insert_with(|| Value::Object(Map::new()))
    .as_object_mut()
    .ok_or_else(missing)?;

  if dependencies.contains_key(id) {
    debug!(package = %id, "package already declared");
    return Ok(());
  }
  dependencies.insert(id.to_string(), Value::String(value));

  write_atomic(manifest_path, &root)?;
  info!(package = %id, "declared package in host manifest");
  Ok(())
}

fn write_atomic(path: &Path, value: &Value) -> Result<(), ClientError> {
  let write_err = |source| ClientError::Write {
    path: path.to_path_buf(),
    source,
  };

  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).map_err(write_err)?;
  }
  let temp_path = path.with_extension("json.tmp");
  let content = serde_json::to_string_pretty(value).map_err(|e| write_err(io::Error::other(e)))?;
  fs::write(&temp_path, content).map_err(write_err)?;
  fs::rename(&temp_path, path).map_err(write_err)
}
