//! Shared fakes for library integration tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;

use templar_lib::config::TemplarConfig;
use templar_lib::consts::TEMPLATE_MANIFEST_FILENAME;
use templar_lib::controller::{Adapters, Controller};
use templar_lib::host::FsAssetIndex;
use templar_lib::install::{AddRequest, MemoryPrefStore, PackageClient, RequestStatus, TracingProgress};
use templar_lib::process::{CommandOutput, CommandRunner, ProcessError};
use templar_lib::setup::PackagesConfigInstaller;

/// Package client whose requests succeed on the first poll.
#[derive(Clone, Default)]
pub struct InstantClient {
  pub dispatched: Rc<RefCell<Vec<String>>>,
}

struct Done;

impl AddRequest for Done {
  fn poll(&mut self) -> RequestStatus {
    RequestStatus::Succeeded
  }
}

impl PackageClient for InstantClient {
  fn add(&mut self, id: &str) -> Box<dyn AddRequest> {
    self.dispatched.borrow_mut().push(id.to_string());
    Box::new(Done)
  }
}

/// Runner that records every invocation and reports success.
#[derive(Clone, Default)]
pub struct LoggingRunner {
  pub commands: Rc<RefCell<Vec<String>>>,
}

impl CommandRunner for LoggingRunner {
  fn run(&mut self, program: &str, args: &[&str], _cwd: &Path) -> Result<CommandOutput, ProcessError> {
    self.commands.borrow_mut().push(format!("{} {}", program, args.join(" ")));
    Ok(CommandOutput {
      status: Some(0),
      ..Default::default()
    })
  }
}

/// A scratch host project with a bundled template.
pub struct Project {
  pub temp: TempDir,
  pub prefs: MemoryPrefStore,
  pub client: InstantClient,
}

impl Project {
  pub fn with_template(manifest: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let template = temp.path().join("Packages").join("com.example.template");
    std::fs::create_dir_all(&template).unwrap();
    std::fs::write(template.join(TEMPLATE_MANIFEST_FILENAME), manifest).unwrap();

    Self {
      temp,
      prefs: MemoryPrefStore::new(),
      client: InstantClient::default(),
    }
  }

  pub fn root(&self) -> PathBuf {
    self.temp.path().to_path_buf()
  }

  /// A controller over this project. Controllers built from the same
  /// project share its preferences, as across an editor reload.
  pub fn controller(&self) -> Controller {
    let config = TemplarConfig {
      success_delay_ms: 0,
      ..Default::default()
    };
    let adapters = Adapters {
      client: Box::new(self.client.clone()),
      index: Box::new(FsAssetIndex::new(self.root(), None)),
      prefs: Box::new(self.prefs.clone()),
      runner: Box::new(LoggingRunner::default()),
      nuget: Box::new(PackagesConfigInstaller::new(self.root(), config.bridge_marker.clone())),
      progress: Box::new(TracingProgress),
    };
    Controller::new(self.root(), config, adapters)
  }
}
