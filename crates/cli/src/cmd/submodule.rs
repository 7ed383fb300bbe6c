use anyhow::Result;

use templar_lib::submodule::SubmoduleOutcome;

use crate::cmd::Session;
use crate::output::{print_hint, print_info, print_success, print_warning, symbols};
use crate::prompts::TermConfirm;

fn print_outcome(name: &str, outcome: SubmoduleOutcome) {
  match outcome {
    SubmoduleOutcome::AlreadyLinked => print_success(&format!("{} is already linked", name)),
    SubmoduleOutcome::Updated => print_success(&format!("{} updated and linked", name)),
    SubmoduleOutcome::Added => print_success(&format!("{} added and linked", name)),
    SubmoduleOutcome::Declined => print_warning(&format!("{}: existing directory left in place", name)),
  }
}

pub fn cmd_submodule(session: &mut Session, name: &str, yes: bool) -> Result<()> {
  let mut confirm = TermConfirm::new(yes);
  let outcome = match session.controller.setup_submodule(name, &mut confirm) {
    Ok(outcome) => outcome,
    Err(e) => {
      if let Ok(steps) = session.controller.submodule_manual_steps(name) {
        print_info(&format!("To set up {} by hand:", name));
        for step in &steps {
          print_hint(step);
        }
      }
      return Err(e.into());
    }
  };
  print_outcome(name, outcome);
  Ok(())
}

pub fn cmd_analyzer(session: &mut Session, yes: bool) -> Result<()> {
  let mut confirm = TermConfirm::new(yes);
  let root = session.controller.project_root().to_path_buf();

  match session.controller.setup_analyzer(&mut confirm)? {
    None => print_warning("Analyzer setup skipped: existing directory left in place"),
    Some(copied) => {
      for path in &copied {
        println!("  {} {}", symbols::SUCCESS, path.strip_prefix(&root).unwrap_or(path).display());
      }
      print_success(&format!("Analyzer built, {} DLL(s) copied", copied.len()));
    }
  }
  Ok(())
}
