//! `templar full-setup`: every phase in order.

use std::time::Instant;

use anyhow::{Result, bail};

use templar_lib::controller::FullSetupStart;
use templar_lib::setup::SetupSummary;

use crate::cmd::Session;
use crate::cmd::install::finish_resumed;
use crate::output::{OutputFormat, print_info, print_json, print_setup_report, print_warning};

pub fn cmd_full_setup(session: &mut Session, output: OutputFormat) -> Result<()> {
  let started = Instant::now();

  match session.controller.full_setup()? {
    FullSetupStart::AlreadyRunning => {
      print_warning("An installation is already running");
      return Ok(());
    }
    FullSetupStart::Installing { count } => {
      if !output.is_json() {
        print_info(&format!("Installing {} package(s)", count));
      }
      session.drain()?;
    }
    FullSetupStart::Finished => {}
    FullSetupStart::Resumed(action) => {
      print_warning("Finishing the interrupted run first; run `templar full-setup` again afterwards");
      return finish_resumed(session, action, started);
    }
  }

  let Some(report) = session.controller.take_report() else {
    bail!("Full Setup did not produce a report");
  };

  if output.is_json() {
    print_json(&serde_json::json!({
      "summary": report.summary(),
      "phases": report.phases,
      "aborted": report.aborted,
      "elapsedMs": started.elapsed().as_millis() as u64,
    }))?;
  } else {
    print_setup_report(&report, started.elapsed());
  }

  if report.summary() == SetupSummary::Aborted {
    bail!("Full Setup aborted");
  }
  Ok(())
}
