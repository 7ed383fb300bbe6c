use anyhow::Result;

use crate::cmd::Session;
use crate::output::{print_success, symbols};

pub fn cmd_folders(session: &mut Session) -> Result<()> {
  let root = session.controller.project_root().to_path_buf();
  let report = session.controller.create_folders()?;

  for path in &report.created {
    println!("  {} {}", symbols::SUCCESS, path.strip_prefix(&root).unwrap_or(path).display());
  }

  print_success(&format!(
    "Folder structure ready ({} created, {} existing)",
    report.created.len(),
    report.existing.len()
  ));
  Ok(())
}
