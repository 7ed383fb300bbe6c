use std::io::{self, IsTerminal, Write};

use templar_lib::confirm::Confirm;

/// Interactive `[y/N]` prompt on the terminal.
///
/// With `assume_yes` every prompt is accepted. Without a terminal every
/// prompt is declined so nothing destructive happens unattended.
pub struct TermConfirm {
  assume_yes: bool,
}

impl TermConfirm {
  pub fn new(assume_yes: bool) -> Self {
    Self { assume_yes }
  }
}

impl Confirm for TermConfirm {
  fn confirm(&mut self, message: &str) -> bool {
    if self.assume_yes {
      return true;
    }

    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
      tracing::warn!(message, "cannot prompt in non-interactive mode, declining; pass --yes to proceed");
      return false;
    }

    match ask(message) {
      Ok(answer) => answer,
      Err(e) => {
        tracing::warn!(error = %e, "failed to read confirmation");
        false
      }
    }
  }
}

fn ask(message: &str) -> io::Result<bool> {
  write!(io::stderr(), "{} [y/N] ", message)?;
  io::stderr().flush()?;

  let mut input = String::new();
  io::stdin().read_line(&mut input)?;

  Ok(parse_answer(&input))
}

fn parse_answer(input: &str) -> bool {
  matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
