//! Synchronous subprocess execution.
//!
//! Git and the analyzer build tool run to completion before the caller
//! continues; output is captured, never streamed.

use std::io;
use std::path::Path;
use std::process::Command;

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ProcessError {
  #[error("failed to start '{command}': {source}")]
  Spawn {
    command: String,
    #[source]
    source: io::Error,
  },

  #[error("'{command}' failed with exit code {}: {stderr}", fmt_code(.code))]
  Failed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },
}

impl ProcessError {
  /// The command line that failed, for manual retry hints.
  pub fn command(&self) -> &str {
    match self {
      ProcessError::Spawn { command, .. } | ProcessError::Failed { command, .. } => command,
    }
  }
}

fn fmt_code(code: &Option<i32>) -> String {
  code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  /// Exit code; `None` when terminated by a signal.
  pub status: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.status == Some(0)
  }
}

/// Launches external programs.
pub trait CommandRunner {
  fn run(&mut self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, ProcessError>;
}

/// Runs real processes through `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
  fn run(&mut self, program: &str, args: &[&str], cwd: &Path) -> Result<CommandOutput, ProcessError> {
    let command = display_command(program, args);
    debug!(command = %command, cwd = %cwd.display(), "spawning process");

    let output = Command::new(program)
      .args(args)
      .current_dir(cwd)
      .output()
      .map_err(|source| ProcessError::Spawn {
        command: command.clone(),
        source,
      })?;

    let output = CommandOutput {
      status: output.status.code(),
      stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    };

    if !output.stdout.is_empty() {
      debug!(stdout = %output.stdout, "command stdout");
    }
    if !output.stderr.is_empty() {
      debug!(stderr = %output.stderr, "command stderr");
    }
    Ok(output)
  }
}

/// Run a command and treat a non-zero exit as an error.
pub fn run_checked(
  runner: &mut dyn CommandRunner,
  program: &str,
  args: &[&str],
  cwd: &Path,
) -> Result<CommandOutput, ProcessError> {
  let output = runner.run(program, args, cwd)?;
  if output.success() {
    return Ok(output);
  }

  let command = display_command(program, args);
  warn!(command = %command, code = ?output.status, stderr = %output.stderr, "command failed");
  Err(ProcessError::Failed {
    command,
    code: output.status,
    stderr: output.stderr,
  })
}

/// Render a command line for logs and manual hints.
pub fn display_command(program: &str, args: &[&str]) -> String {
  std::iter::once(program)
    .chain(args.iter().copied())
    .map(|part| {
      if part.is_empty() || part.contains(char::is_whitespace) {
        format!("\"{}\"", part)
      } else {
        part.to_string()
      }
    })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Path argument as a `&str`, lossily converted.
pub(crate) fn path_arg(path: &Path) -> String {
  path.to_string_lossy().into_owned()
}
