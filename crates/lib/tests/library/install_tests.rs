//! Install queue behavior through the controller.

use templar_lib::consts::{PREF_KEY_FULL_SETUP, PREF_KEY_INSTALL_STATE};
use templar_lib::controller::{Controller, InstallStart, ResumeAction};
use templar_lib::diff::{BuiltinPolicy, packages_to_install};
use templar_lib::host::HostEnvironment;
use templar_lib::install::{BatchOutcome, InstallQueue, PrefStore, StepEvent};
use templar_lib::manifest::{DesiredManifest, InstalledState};

use super::common::Project;

fn drain(controller: &mut Controller) -> BatchOutcome {
  for _ in 0..100 {
    if let StepEvent::Finished(outcome) = controller.tick().unwrap() {
      return outcome;
    }
  }
  panic!("batch did not finish within 100 ticks");
}

#[test]
fn single_package_installs_and_clears_state() {
  let project = Project::with_template(r#"{ "packages": ["com.a"] }"#);
  let mut controller = project.controller();

  assert_eq!(
    controller.install_dependencies().unwrap(),
    InstallStart::Started { count: 1 }
  );
  assert!(project.prefs.contains(PREF_KEY_INSTALL_STATE));

  assert_eq!(
    drain(&mut controller),
    BatchOutcome::Completed {
      installed: 1,
      skipped: 0
    }
  );
  assert_eq!(*project.client.dispatched.borrow(), ["com.a"]);
  assert!(!project.prefs.contains(PREF_KEY_INSTALL_STATE));
  assert!(controller.is_idle());
}

#[test]
fn differently_spelled_git_url_counts_as_installed() {
  let desired = DesiredManifest {
    git_packages: vec!["https://github.com/x/y.git?path=/p".to_string()],
    ..Default::default()
  };
  let mut installed = InstalledState::default();
  installed
    .dependencies
    .insert("https://github.com/x/y.git?path=p#v1".to_string(), "1.0.0".to_string());

  let missing = packages_to_install(
    &desired,
    &installed,
    &HostEnvironment::default(),
    &BuiltinPolicy::default(),
  );
  assert!(missing.is_empty());
}

#[test]
fn bridge_package_dequeues_first() {
  let list = vec![
    "com.a".to_string(),
    "https://github.com/GlitchEnzo/NuGetForUnity.git?path=/src/NuGetForUnity".to_string(),
    "com.b".to_string(),
  ];
  let mut queue = InstallQueue::build(list, "NuGetForUnity");

  assert!(queue.dequeue().unwrap().contains("NuGetForUnity"));
  assert_eq!(queue.remaining(), ["com.a", "com.b"]);
}

#[test]
fn reload_resumes_exactly_the_remaining_packages() {
  let project = Project::with_template(r#"{ "packages": ["com.a", "com.b", "com.c"] }"#);
  project
    .prefs
    .set_string(
      PREF_KEY_INSTALL_STATE,
      r#"{"remainingPackages":["com.b","com.c"],"isInstalling":true,"totalPackages":3}"#,
    )
    .unwrap();

  let mut controller = project.controller();
  assert_eq!(
    controller.restore_after_reload().unwrap(),
    ResumeAction::Resumed { remaining: 2 }
  );
  assert_eq!(controller.tick().unwrap(), StepEvent::Waiting);

  assert!(matches!(drain(&mut controller), BatchOutcome::Completed { .. }));
  assert_eq!(*project.client.dispatched.borrow(), ["com.b", "com.c"]);
}

#[test]
fn interrupted_full_setup_continues_after_reload() {
  let project = Project::with_template(r#"{ "packages": ["com.a"], "folderStructure": ["Assets/Art"] }"#);

  let mut first = project.controller();
  first.full_setup().unwrap();
  assert!(project.prefs.get_bool(PREF_KEY_FULL_SETUP).unwrap());
  drop(first);

  let mut second = project.controller();
  assert_eq!(
    second.restore_after_reload().unwrap(),
    ResumeAction::Resumed { remaining: 1 }
  );
  drain(&mut second);

  let report = second.take_report().expect("full setup report");
  assert!(report.phases.iter().any(|p| p.name == "config files"));
  assert!(!project.prefs.get_bool(PREF_KEY_FULL_SETUP).unwrap());
  assert!(project.root().join("Assets/Art").is_dir());
}
