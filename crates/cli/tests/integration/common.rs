//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Project-relative directory that holds the bundled template.
pub const TEMPLATE_DIR: &str = "Packages/com.example.template/Template";

pub const NUGET_BRIDGE_URL: &str = "https://github.com/GlitchEnzo/NuGetForUnity.git?path=/src/NuGetForUnity";

/// Isolated host project.
///
/// Each test gets its own project directory with an empty host manifest, a
/// fast scheduler configuration and a private preference store.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a project with an editor version and no template.
  pub fn empty() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("Packages/manifest.json", r#"{ "dependencies": {} }"#);
    env.write_file("ProjectSettings/ProjectVersion.txt", "m_EditorVersion: 2022.3.10f1\n");
    env.write_config(json!({}));
    env
  }

  /// Create a project whose template declares `manifest`.
  pub fn with_template(manifest: Value) -> Self {
    let env = Self::empty();
    env.write_template_file(
      "template-manifest.json",
      &serde_json::to_string_pretty(&manifest).unwrap(),
    );
    env
  }

  /// Write `templar.json`, merging `extra` over the fast test defaults.
  pub fn write_config(&self, extra: Value) {
    let mut config = json!({ "tickIntervalMs": 1, "successDelayMs": 0 });
    if let (Some(base), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
      for (k, v) in extra {
        base.insert(k.clone(), v.clone());
      }
    }
    self.write_file("templar.json", &config.to_string());
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join("project").join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Write a file relative to the template directory.
  pub fn write_template_file(&self, relative_path: &str, content: &str) {
    self.write_file(&format!("{}/{}", TEMPLATE_DIR, relative_path), content);
  }

  pub fn read_file(&self, relative_path: &str) -> String {
    std::fs::read_to_string(self.project_path().join(relative_path)).unwrap()
  }

  pub fn exists(&self, relative_path: &str) -> bool {
    self.project_path().join(relative_path).exists()
  }

  /// The host manifest's `dependencies` object.
  pub fn dependencies(&self) -> Value {
    let manifest: Value = serde_json::from_str(&self.read_file("Packages/manifest.json")).unwrap();
    manifest["dependencies"].clone()
  }

  /// Project root (isolated per test).
  pub fn project_path(&self) -> PathBuf {
    let p = self.temp.path().join("project");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Preference store directory, outside the project.
  pub fn state_path(&self) -> PathBuf {
    let p = self.temp.path().join("state");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Raw contents of the preference store.
  pub fn prefs(&self) -> Value {
    match std::fs::read_to_string(self.state_path().join("prefs.json")) {
      Ok(content) => serde_json::from_str(&content).unwrap(),
      Err(_) => json!({}),
    }
  }

  /// Seed the preference store.
  pub fn write_prefs(&self, prefs: Value) {
    std::fs::write(self.state_path().join("prefs.json"), prefs.to_string()).unwrap();
  }

  /// Get a pre-configured Command for the templar binary.
  ///
  /// Sets `TEMPLAR_PROJECT` and `TEMPLAR_STATE_DIR` for isolated testing.
  pub fn templar_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("templar");
    cmd.env("TEMPLAR_PROJECT", self.project_path());
    cmd.env("TEMPLAR_STATE_DIR", self.state_path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}
