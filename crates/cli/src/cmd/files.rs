//! Template file copy commands.

use anyhow::{Result, bail};

use templar_lib::setup::{CopyReport, ScriptPreset};

use crate::cmd::Session;
use crate::output::print_copy_report;

fn finish(session: &Session, what: &str, report: &CopyReport) -> Result<()> {
  if !print_copy_report(session.controller.project_root(), what, report) {
    bail!("Some {} could not be copied", what);
  }
  Ok(())
}

pub fn cmd_config_files(session: &mut Session) -> Result<()> {
  let report = session.controller.copy_config_files()?;
  finish(session, "config file(s)", &report)
}

pub fn cmd_license_files(session: &mut Session) -> Result<()> {
  let report = session.controller.copy_license_files()?;
  finish(session, "license file(s)", &report)
}

pub fn cmd_scripts(session: &mut Session, preset: ScriptPreset) -> Result<()> {
  let report = session.controller.copy_scripts(preset)?;
  finish(session, "script(s)", &report)
}
