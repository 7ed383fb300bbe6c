//! Package installation commands: `install`, `resume` and `cancel`.

use std::time::Instant;

use anyhow::{Result, bail};

use templar_lib::controller::{InstallStart, ResumeAction};
use templar_lib::install::BatchOutcome;
use templar_lib::setup::SetupSummary;

use crate::cmd::Session;
use crate::output::{format_duration, print_error, print_hint, print_info, print_setup_report, print_success, print_warning};

/// Print how a batch ended. Fails for a fatal install error.
fn report_outcome(outcome: Option<&BatchOutcome>, elapsed: std::time::Duration) -> Result<()> {
  match outcome {
    Some(BatchOutcome::Completed { installed, skipped }) => {
      print_success(&format!(
        "Installed {} package(s) in {}",
        installed,
        format_duration(elapsed)
      ));
      if *skipped > 0 {
        print_warning(&format!("{} package(s) skipped; see the log above", skipped));
      }
      Ok(())
    }
    Some(outcome @ BatchOutcome::Failed { package, message }) => {
      print_error(&format!("Failed to install {}: {}", package, message));
      if let Some(hint) = outcome.hint() {
        print_hint(&hint);
      }
      bail!("Package installation aborted")
    }
    Some(BatchOutcome::Cancelled) => {
      print_warning("Installation cancelled");
      Ok(())
    }
    None => Ok(()),
  }
}

pub fn cmd_install(session: &mut Session) -> Result<()> {
  let started = Instant::now();

  match session.controller.install_dependencies()? {
    InstallStart::NothingToInstall => {
      print_success("All packages are already installed");
      return Ok(());
    }
    InstallStart::AlreadyRunning => {
      print_warning("An installation is already running");
      return Ok(());
    }
    InstallStart::Resumed(action) => return finish_resumed(session, action, started),
    InstallStart::Started { count } => print_info(&format!("Installing {} package(s)", count)),
  }

  let outcome = session.drain()?;
  report_outcome(outcome.as_ref(), started.elapsed())
}

pub fn cmd_resume(session: &mut Session) -> Result<()> {
  let started = Instant::now();

  match session.controller.restore_after_reload()? {
    ResumeAction::Nothing => {
      print_info("Nothing to resume");
      Ok(())
    }
    action => finish_resumed(session, action, started),
  }
}

/// Drive work picked up from a previous run and report how it ended.
pub(crate) fn finish_resumed(session: &mut Session, action: ResumeAction, started: Instant) -> Result<()> {
  let outcome = match action {
    ResumeAction::Nothing => None,
    ResumeAction::Resumed { remaining } => {
      print_info(&format!("Resuming installation, {} package(s) remaining", remaining));
      session.drain()?
    }
    ResumeAction::ContinuedFullSetup => {
      print_info("Continuing an interrupted Full Setup");
      None
    }
  };

  let report = session.controller.take_report();
  if let Some(report) = &report {
    print_setup_report(report, started.elapsed());
  }
  report_outcome(outcome.as_ref(), started.elapsed())?;

  if report.is_some_and(|r| r.summary() == SetupSummary::Aborted) {
    bail!("Full Setup aborted");
  }
  Ok(())
}

pub fn cmd_cancel(session: &mut Session) -> Result<()> {
  if session.controller.cancel()? {
    print_success("Cancelled the pending installation");
  } else {
    print_info("Nothing to cancel");
  }
  Ok(())
}
