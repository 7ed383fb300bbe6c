//! Full Setup integration tests.

use predicates::prelude::*;
use serde_json::{Value, json};

use super::common::{NUGET_BRIDGE_URL, TestEnv};

fn setup_env() -> TestEnv {
  let env = TestEnv::with_template(json!({
    "packages": ["com.example.alpha"],
    "gitPackages": [NUGET_BRIDGE_URL],
    "folderStructure": ["Assets/Scripts/Runtime"],
    "nugetPackages": [{ "id": "R3", "version": "1.2.9" }],
    "configFiles": [{ "source": ".editorconfig", "destination": "projectRoot" }],
  }));
  env.write_template_file("ConfigTemplates/.editorconfig", "root = true\n");
  env
}

#[test]
fn full_setup_runs_every_phase() {
  let env = setup_env();

  env
    .templar_cmd()
    .arg("full-setup")
    .assert()
    .success()
    .stdout(predicate::str::contains("Full Setup completed"));

  assert!(env.exists("Assets/Scripts/Runtime"));
  assert_eq!(env.dependencies()["com.example.alpha"], "latest");
  assert!(env.read_file("Assets/packages.config").contains(r#"id="R3""#));
  assert_eq!(env.read_file(".editorconfig"), "root = true\n");
  assert!(env.prefs().get("templar.fullSetupInProgress").is_none());
}

#[test]
fn full_setup_json_lists_phases() {
  let env = setup_env();

  let output = env
    .templar_cmd()
    .args(["full-setup", "--output", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let report: Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["summary"], "completed");
  let names: Vec<&str> = report["phases"]
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["name"].as_str().unwrap())
    .collect();
  assert_eq!(names, ["folders", "packages", "nuget", "config files"]);
}

#[test]
fn full_setup_with_nothing_to_install_still_runs_phases() {
  let env = setup_env();
  env.templar_cmd().arg("install").assert().success();

  env
    .templar_cmd()
    .arg("full-setup")
    .assert()
    .success()
    .stdout(predicate::str::contains("nothing to install"));

  assert!(env.exists("Assets/packages.config"));
}

#[test]
fn fatal_install_aborts_full_setup() {
  let env = TestEnv::with_template(json!({
    "packages": ["Not A Package"],
    "configFiles": [{ "source": ".editorconfig", "destination": "projectRoot" }],
  }));
  env.write_template_file("ConfigTemplates/.editorconfig", "root = true\n");

  env
    .templar_cmd()
    .arg("full-setup")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Full Setup aborted"));

  assert!(!env.exists(".editorconfig"));
  assert!(env.prefs().get("templar.fullSetupInProgress").is_none());
}

#[test]
fn resume_finishes_interrupted_full_setup() {
  let env = setup_env();
  env.write_file(
    "Packages/manifest.json",
    &json!({ "dependencies": { "com.github-glitchenzo.nugetforunity": NUGET_BRIDGE_URL } }).to_string(),
  );
  let state = json!({
    "remainingPackages": ["com.example.alpha"],
    "isInstalling": true,
    "totalPackages": 2,
  });
  env.write_prefs(json!({
    "templar.installState": state.to_string(),
    "templar.fullSetupInProgress": true,
  }));

  env
    .templar_cmd()
    .arg("resume")
    .assert()
    .success()
    .stdout(predicate::str::contains("Full Setup completed"));

  assert_eq!(env.dependencies()["com.example.alpha"], "latest");
  assert!(env.exists("Assets/packages.config"));
  assert!(env.prefs().get("templar.fullSetupInProgress").is_none());
}

#[test]
fn plain_install_finishes_interrupted_full_setup() {
  let env = setup_env();
  env.write_file(
    "Packages/manifest.json",
    &json!({ "dependencies": { "com.github-glitchenzo.nugetforunity": NUGET_BRIDGE_URL } }).to_string(),
  );
  let state = json!({
    "remainingPackages": ["com.example.alpha"],
    "isInstalling": true,
    "totalPackages": 2,
  });
  env.write_prefs(json!({
    "templar.installState": state.to_string(),
    "templar.fullSetupInProgress": true,
  }));

  env
    .templar_cmd()
    .arg("install")
    .assert()
    .success()
    .stdout(predicate::str::contains("1 package(s) remaining"))
    .stdout(predicate::str::contains("Full Setup completed"));

  assert!(env.exists("Assets/packages.config"));
  let prefs = env.prefs();
  assert!(prefs.get("templar.installState").is_none());
  assert!(prefs.get("templar.fullSetupInProgress").is_none());
}

#[test]
fn missing_nuget_bridge_skips_nuget_phase() {
  let env = TestEnv::with_template(json!({
    "nugetPackages": [{ "id": "R3", "version": "1.2.9" }],
  }));

  env
    .templar_cmd()
    .arg("full-setup")
    .assert()
    .success()
    .stdout(predicate::str::contains("NuGet bridge package not installed"));

  assert!(!env.exists("Assets/packages.config"));
}
