use anyhow::Result;

use templar_lib::setup::NugetChange;

use crate::cmd::Session;
use crate::output::{print_info, print_success, symbols};

pub fn cmd_nuget(session: &mut Session) -> Result<()> {
  let changes = session.controller.install_nuget()?;

  if changes.is_empty() {
    print_info("The template declares no NuGet packages");
    return Ok(());
  }

  for (id, change) in &changes {
    let label = match change {
      NugetChange::Added => "added",
      NugetChange::Updated => "updated",
      NugetChange::Unchanged => "unchanged",
    };
    println!("  {} {} ({})", symbols::INFO, id, label);
  }

  let touched = changes.iter().filter(|(_, c)| *c != NugetChange::Unchanged).count();
  print_success(&format!("{} NuGet package(s) declared, {} changed", changes.len(), touched));
  Ok(())
}
