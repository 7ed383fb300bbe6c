//! Status command implementation.
//!
//! Displays the persisted install state, the Full Setup flag and which
//! declared packages are still missing.

use anyhow::Result;

use templar_lib::controller::ControllerError;
use templar_lib::install::StateError;

use crate::cmd::Session;
use crate::output::{print_hint, print_info, print_json, print_stat, print_success, print_warning, symbols};

pub fn cmd_status(session: &Session, json: bool) -> Result<()> {
  let controller = &session.controller;
  let status = match controller.status() {
    Ok(status) => status,
    Err(ControllerError::State(e @ StateError::Corrupt { .. })) => {
      print_warning(&format!("Persisted install state is unreadable: {}", e));
      print_hint("run `templar cancel` to discard it");
      return Err(ControllerError::State(e).into());
    }
    Err(e) => return Err(e.into()),
  };
  let manifest = controller.manifest();
  let missing = controller.packages_to_install(&manifest);

  if json {
    let json_output = serde_json::json!({
      "projectRoot": controller.project_root(),
      "installState": status.state,
      "fullSetupInProgress": status.full_setup_in_progress,
      "missingPackages": missing,
    });
    return print_json(&json_output);
  }

  print_info(&format!("Project: {}", controller.project_root().display()));
  match &status.state {
    Some(state) if state.is_installing => {
      print_stat("Installing", "interrupted, run 'templar resume'");
      print_stat(
        "Progress",
        &format!(
          "{}/{} remaining",
          state.remaining_packages.len(),
          state.total_packages
        ),
      );
      if state.skipped_packages > 0 {
        print_stat("Skipped", &state.skipped_packages.to_string());
      }
    }
    _ => print_stat("Installing", "no"),
  }
  print_stat(
    "Full Setup",
    if status.full_setup_in_progress { "in progress" } else { "idle" },
  );

  println!();
  if missing.is_empty() {
    print_success("All declared packages are installed");
  } else {
    println!("Missing packages:");
    for id in &missing {
      println!("  {} {}", symbols::INFO, id);
    }
  }

  Ok(())
}
