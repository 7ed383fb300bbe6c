//! Folder, file-copy and NuGet command integration tests.

use predicates::prelude::*;
use serde_json::json;

use super::common::{NUGET_BRIDGE_URL, TestEnv};

#[test]
fn folders_creates_declared_structure() {
  let env = TestEnv::with_template(json!({
    "folderStructure": ["Assets/Scripts/Runtime", "Assets/Art/Materials"],
  }));

  env
    .templar_cmd()
    .arg("folders")
    .assert()
    .success()
    .stdout(predicate::str::contains("2 created"));

  assert!(env.exists("Assets/Scripts/Runtime"));
  assert!(env.exists("Assets/Art/Materials"));

  env
    .templar_cmd()
    .arg("folders")
    .assert()
    .success()
    .stdout(predicate::str::contains("0 created, 2 existing"));
}

#[test]
fn config_files_overwrite_destinations() {
  let env = TestEnv::with_template(json!({
    "configFiles": [
      { "source": ".editorconfig", "destination": "projectRoot" },
      { "source": "csc.rsp", "destination": "assets" },
    ],
  }));
  env.write_template_file("ConfigTemplates/.editorconfig", "root = true\n");
  env.write_template_file("ConfigTemplates/csc.rsp", "-nullable:enable\n");
  env.write_file(".editorconfig", "stale\n");

  env.templar_cmd().arg("config-files").assert().success();

  assert_eq!(env.read_file(".editorconfig"), "root = true\n");
  assert_eq!(env.read_file("Assets/csc.rsp"), "-nullable:enable\n");
}

#[test]
fn missing_config_template_fails_only_that_entry() {
  let env = TestEnv::with_template(json!({
    "configFiles": [
      { "source": "missing.txt", "destination": "projectRoot" },
      { "source": ".editorconfig", "destination": "projectRoot" },
    ],
  }));
  env.write_template_file("ConfigTemplates/.editorconfig", "root = true\n");

  env
    .templar_cmd()
    .arg("config-files")
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing.txt"));

  assert!(env.exists(".editorconfig"));
}

#[test]
fn license_files_keep_existing_copies() {
  let env = TestEnv::with_template(json!({ "licenseFolderPath": "Licenses" }));
  env.write_template_file("Licenses/R3.asset", "r3");
  env.write_template_file("Licenses/LitMotion.asset", "litmotion");
  env.write_template_file("Licenses/README.md", "ignored");
  env.write_file("Assets/LicenseMaster/R3.asset", "edited");

  env
    .templar_cmd()
    .arg("license-files")
    .assert()
    .success()
    .stdout(predicate::str::contains("1 license file(s) copied"));

  assert_eq!(env.read_file("Assets/LicenseMaster/R3.asset"), "edited");
  assert_eq!(env.read_file("Assets/LicenseMaster/LitMotion.asset"), "litmotion");
  assert!(!env.exists("Assets/LicenseMaster/README.md"));
}

#[test]
fn scripts_split_editor_and_utility_templates() {
  let env = TestEnv::with_template(json!({}));
  env.write_template_file("ScriptTemplates/Singleton.cs.template", "class Singleton {}");
  env.write_template_file("ScriptTemplates/SceneSwitchLeftButton.cs.template", "class SceneSwitch {}");

  env.templar_cmd().args(["scripts", "utility"]).assert().success();
  env.templar_cmd().args(["scripts", "editor"]).assert().success();

  assert!(env.exists("Assets/Scripts/Utils/Singleton.cs"));
  assert!(!env.exists("Assets/Scripts/Utils/SceneSwitchLeftButton.cs"));
  assert!(env.exists("Assets/Editor/SceneSwitchLeftButton.cs"));
  assert!(!env.exists("Assets/Editor/Singleton.cs"));
}

#[test]
fn nuget_requires_bridge_package() {
  let env = TestEnv::with_template(json!({
    "nugetPackages": [{ "id": "R3", "version": "1.2.9" }],
  }));

  env
    .templar_cmd()
    .arg("nuget")
    .assert()
    .failure()
    .stderr(predicate::str::contains("templar install"));

  assert!(!env.exists("Assets/packages.config"));
}

#[test]
fn nuget_declares_packages_once_bridge_is_present() {
  let env = TestEnv::with_template(json!({
    "nugetPackages": [{ "id": "R3", "version": "1.2.9" }],
  }));
  env.write_file(
    "Packages/manifest.json",
    &json!({ "dependencies": { "com.github-glitchenzo.nugetforunity": NUGET_BRIDGE_URL } }).to_string(),
  );

  env
    .templar_cmd()
    .arg("nuget")
    .assert()
    .success()
    .stdout(predicate::str::contains("R3 (added)"));

  let config = env.read_file("Assets/packages.config");
  assert!(config.contains(r#"id="R3""#));
  assert!(config.contains(r#"version="1.2.9""#));

  env
    .templar_cmd()
    .arg("nuget")
    .assert()
    .success()
    .stdout(predicate::str::contains("R3 (unchanged)"));
}

#[test]
fn missing_template_reports_hint() {
  let env = TestEnv::empty();

  env
    .templar_cmd()
    .arg("config-files")
    .assert()
    .failure()
    .stderr(predicate::str::contains("template directory not found"))
    .stderr(predicate::str::contains("templateDir"));
}
