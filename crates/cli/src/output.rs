//! CLI output formatting utilities.
//!
//! Provides consistent formatting for terminal output including colored status
//! messages, setup reports, and the install progress line.

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use templar_lib::install::ProgressSink;
use templar_lib::setup::{CopyReport, PhaseStatus, SetupReport, SetupSummary};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
  pub const SKIP: &str = "-";
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn format_percent(fraction: f32) -> String {
  format!("{:>3}%", (fraction.clamp(0.0, 1.0) * 100.0).round() as u32)
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_hint(hint: &str) {
  eprintln!(
    "  {} {}",
    symbols::ARROW.if_supports_color(Stream::Stderr, |s| s.cyan()),
    hint
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
  path.strip_prefix(root).unwrap_or(path)
}

/// Print the result of a copy phase. Returns `false` if any entry failed.
pub fn print_copy_report(root: &Path, what: &str, report: &CopyReport) -> bool {
  for path in &report.copied {
    println!("  {} {}", symbols::SUCCESS, relative(root, path).display());
  }
  for path in &report.kept {
    println!(
      "  {} {} {}",
      symbols::SKIP,
      relative(root, path).display(),
      "(exists)".if_supports_color(Stream::Stdout, |s| s.dimmed())
    );
  }
  for (entry, err) in &report.failed {
    print_error(&format!("{}: {}", entry, err));
  }

  if report.is_ok() {
    print_success(&format!("{} {} copied", report.copied.len(), what));
  } else {
    print_warning(&format!(
      "{} {} copied, {} failed",
      report.copied.len(),
      what,
      report.failed.len()
    ));
  }
  report.is_ok()
}

pub fn print_setup_report(report: &SetupReport, elapsed: Duration) {
  println!();
  println!("Full Setup:");
  for phase in &report.phases {
    let symbol = match phase.status {
      PhaseStatus::Succeeded => symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()).to_string(),
      PhaseStatus::Skipped => symbols::SKIP.if_supports_color(Stream::Stdout, |s| s.dimmed()).to_string(),
      PhaseStatus::Failed => symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()).to_string(),
    };
    match &phase.detail {
      Some(detail) => println!(
        "  {} {} {}",
        symbol,
        phase.name,
        format!("({})", detail).if_supports_color(Stream::Stdout, |s| s.dimmed())
      ),
      None => println!("  {} {}", symbol, phase.name),
    }
  }
  println!();

  let message = format!("Full Setup {} in {}", report.summary(), format_duration(elapsed));
  match report.summary() {
    SetupSummary::Completed => print_success(&message),
    SetupSummary::CompletedWithErrors => print_warning(&message),
    SetupSummary::Aborted => {
      print_error(&message);
      if let Some(reason) = &report.aborted {
        print_hint(reason);
      }
    }
  }
}

/// Single-line progress indicator on stderr.
///
/// Redraws in place on a terminal and prints one line per update otherwise.
pub struct TermProgress {
  interactive: bool,
  last_label: Option<String>,
}

impl TermProgress {
  pub fn new() -> Self {
    Self {
      interactive: io::stderr().is_terminal(),
      last_label: None,
    }
  }
}

impl ProgressSink for TermProgress {
  fn report(&mut self, label: &str, fraction: f32) {
    let mut stderr = io::stderr();
    if self.interactive {
      let _ = write!(stderr, "\r\x1b[2K{} {} {}", symbols::ARROW, format_percent(fraction), label);
      let _ = stderr.flush();
    } else if self.last_label.as_deref() != Some(label) {
      let _ = writeln!(stderr, "{} {} {}", symbols::ARROW, format_percent(fraction), label);
    }
    self.last_label = Some(label.to_string());
  }

  fn clear(&mut self) {
    if self.interactive && self.last_label.is_some() {
      let mut stderr = io::stderr();
      let _ = write!(stderr, "\r\x1b[2K");
      let _ = stderr.flush();
    }
    self.last_label = None;
  }
}
