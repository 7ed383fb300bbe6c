//! Submodule provisioning against a real filesystem.

use std::path::PathBuf;

use templar_lib::confirm::AutoConfirm;
use templar_lib::manifest::SubmoduleSpec;
use templar_lib::submodule::{SubmoduleOutcome, SubmoduleProvisioner};
use tempfile::TempDir;

use super::common::LoggingRunner;

fn spec() -> SubmoduleSpec {
  SubmoduleSpec {
    name: "u".to_string(),
    url: "https://github.com/o/u.git".to_string(),
    link_name: "U".to_string(),
  }
}

#[cfg(unix)]
#[test]
fn correct_link_needs_no_git() {
  let temp = TempDir::new().unwrap();
  let scripts = PathBuf::from("Assets").join("Scripts");
  std::fs::create_dir_all(temp.path().join("u")).unwrap();
  std::fs::create_dir_all(temp.path().join(&scripts)).unwrap();
  std::os::unix::fs::symlink("../../u", temp.path().join(&scripts).join("U")).unwrap();

  let provisioner = SubmoduleProvisioner::new(temp.path().to_path_buf(), scripts);
  let mut runner = LoggingRunner::default();

  let outcome = provisioner
    .setup_submodule(&mut runner, &spec(), &mut AutoConfirm(false))
    .unwrap();

  assert_eq!(outcome, SubmoduleOutcome::AlreadyLinked);
  assert!(runner.commands.borrow().is_empty());
}

#[test]
fn new_submodule_is_added_then_linked() {
  let temp = TempDir::new().unwrap();
  let provisioner = SubmoduleProvisioner::new(temp.path().to_path_buf(), PathBuf::from("Assets").join("Scripts"));
  let mut runner = LoggingRunner::default();

  // The fake runner never creates the checkout; the link may dangle.
  let result = provisioner.setup_submodule(&mut runner, &spec(), &mut AutoConfirm(true));

  let commands = runner.commands.borrow();
  assert_eq!(
    commands[..2],
    [
      "git submodule add https://github.com/o/u.git u".to_string(),
      "git submodule update --init --recursive".to_string(),
    ]
  );
  if cfg!(unix) {
    assert_eq!(result.unwrap(), SubmoduleOutcome::Added);
  }
}

#[test]
fn declining_replacement_leaves_directory() {
  let temp = TempDir::new().unwrap();
  std::fs::create_dir_all(temp.path().join("u")).unwrap();
  std::fs::write(temp.path().join("u").join("keep.txt"), "mine").unwrap();

  let provisioner = SubmoduleProvisioner::new(temp.path().to_path_buf(), PathBuf::from("Assets").join("Scripts"));
  let mut runner = LoggingRunner::default();

  let outcome = provisioner
    .setup_submodule(&mut runner, &spec(), &mut AutoConfirm(false))
    .unwrap();

  assert_eq!(outcome, SubmoduleOutcome::Declined);
  assert!(temp.path().join("u").join("keep.txt").exists());
  assert!(runner.commands.borrow().is_empty());
}
