//! Install, resume, cancel and status integration tests.

use predicates::prelude::*;
use serde_json::{Value, json};

use super::common::TestEnv;

const GIT_PACKAGE: &str = "https://github.com/example/beta.git?path=src/Beta";

fn two_packages() -> TestEnv {
  TestEnv::with_template(json!({
    "packages": ["com.example.alpha"],
    "gitPackages": [GIT_PACKAGE],
  }))
}

fn status_json(env: &TestEnv) -> Value {
  let output = env.templar_cmd().args(["status", "--json"]).output().unwrap();
  assert!(output.status.success());
  serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn install_declares_missing_packages() {
  let env = two_packages();

  env
    .templar_cmd()
    .arg("install")
    .assert()
    .success()
    .stdout(predicate::str::contains("Installed 2 package(s)"));

  let deps = env.dependencies();
  assert_eq!(deps["com.example.alpha"], "latest");
  assert_eq!(deps[GIT_PACKAGE], GIT_PACKAGE);
  assert!(env.prefs().get("templar.installState").is_none());
}

#[test]
fn install_is_idempotent() {
  let env = two_packages();
  env.templar_cmd().arg("install").assert().success();

  env
    .templar_cmd()
    .arg("install")
    .assert()
    .success()
    .stdout(predicate::str::contains("already installed"));
}

#[test]
fn preinstalled_git_package_matches_by_repository() {
  let env = two_packages();
  env.write_file(
    "Packages/manifest.json",
    r#"{ "dependencies": { "com.example.beta": "https://github.com/example/beta.git?path=src/Beta#1.0.0" } }"#,
  );

  let status = status_json(&env);
  assert_eq!(status["missingPackages"], json!(["com.example.alpha"]));
}

#[test]
fn builtin_packages_are_not_installed_on_newer_editors() {
  let env = TestEnv::with_template(json!({ "packages": ["com.unity.ugui", "com.example.alpha"] }));
  env.write_file("ProjectSettings/ProjectVersion.txt", "m_EditorVersion: 6000.0.23f1\n");

  let status = status_json(&env);
  assert_eq!(status["missingPackages"], json!(["com.example.alpha"]));
}

#[test]
fn fatal_install_error_aborts_batch() {
  let env = TestEnv::with_template(json!({ "packages": ["Not A Package", "com.example.alpha"] }));

  env
    .templar_cmd()
    .arg("install")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Failed to install Not A Package"))
    .stderr(predicate::str::contains("add 'Not A Package' manually"));

  assert!(env.dependencies().get("com.example.alpha").is_none());
  assert!(status_json(&env)["installState"].is_null());
}

#[test]
fn skippable_install_error_continues_batch() {
  let env = TestEnv::with_template(json!({ "packages": ["Not A Package", "com.example.alpha"] }));
  env.write_config(json!({ "failurePatterns": ["invalid package identifier"] }));

  env
    .templar_cmd()
    .arg("install")
    .assert()
    .success()
    .stderr(predicate::str::contains("1 package(s) skipped"));

  assert_eq!(env.dependencies()["com.example.alpha"], "latest");
}

#[test]
fn resume_continues_interrupted_batch() {
  let env = two_packages();
  let state = json!({
    "remainingPackages": ["com.example.alpha"],
    "isInstalling": true,
    "totalPackages": 2,
    "skippedPackages": 0,
  });
  env.write_prefs(json!({ "templar.installState": state.to_string() }));

  let status = status_json(&env);
  assert_eq!(status["installState"]["remainingPackages"], json!(["com.example.alpha"]));

  env
    .templar_cmd()
    .arg("resume")
    .assert()
    .success()
    .stdout(predicate::str::contains("1 package(s) remaining"));

  assert_eq!(env.dependencies()["com.example.alpha"], "latest");
  assert!(env.dependencies().get(GIT_PACKAGE).is_none());
  assert!(status_json(&env)["installState"].is_null());
}

#[test]
fn resume_without_state_does_nothing() {
  let env = two_packages();

  env
    .templar_cmd()
    .arg("resume")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to resume"));
}

#[test]
fn corrupt_state_is_reported_then_discarded_on_resume() {
  let env = two_packages();
  env.write_prefs(json!({ "templar.installState": "{not json" }));

  env
    .templar_cmd()
    .arg("status")
    .assert()
    .failure()
    .stderr(predicate::str::contains("templar cancel"));

  env
    .templar_cmd()
    .arg("resume")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to resume"));

  assert!(env.prefs().get("templar.installState").is_none());
}

#[test]
fn cancel_clears_persisted_state() {
  let env = two_packages();
  let state = json!({
    "remainingPackages": ["com.example.alpha"],
    "isInstalling": true,
    "totalPackages": 1,
  });
  env.write_prefs(json!({
    "templar.installState": state.to_string(),
    "templar.fullSetupInProgress": true,
  }));

  env
    .templar_cmd()
    .arg("cancel")
    .assert()
    .success()
    .stdout(predicate::str::contains("Cancelled"));

  let prefs = env.prefs();
  assert!(prefs.get("templar.installState").is_none());
  assert!(prefs.get("templar.fullSetupInProgress").is_none());

  env
    .templar_cmd()
    .arg("cancel")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to cancel"));
}
