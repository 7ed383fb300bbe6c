mod cmd;
mod output;
mod prompts;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use templar_lib::controller::ControllerError;
use templar_lib::setup::ScriptPreset;

use crate::cmd::Session;
use crate::output::{OutputFormat, print_error, print_hint};

/// templar - Unity project template bootstrapper
#[derive(Parser)]
#[command(name = "templar")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project root (defaults to TEMPLAR_PROJECT, then the current directory)
  #[arg(short, long, global = true)]
  project: Option<PathBuf>,

  /// Answer yes to every confirmation prompt
  #[arg(short, long, global = true)]
  yes: bool,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScriptKind {
  /// Runtime utilities into Assets/Scripts/Utils
  Utility,
  /// Editor-only scripts into Assets/Editor
  Editor,
}

impl From<ScriptKind> for ScriptPreset {
  fn from(kind: ScriptKind) -> Self {
    match kind {
      ScriptKind::Utility => ScriptPreset::Utility,
      ScriptKind::Editor => ScriptPreset::Editor,
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Create the declared folder structure
  Folders,

  /// Install every declared package missing from the project
  Install,

  /// Declare the template's NuGet packages
  Nuget,

  /// Copy template config files into the project
  ConfigFiles,

  /// Copy template license files into the project
  LicenseFiles,

  /// Copy script templates into the project
  Scripts {
    #[arg(value_enum)]
    kind: ScriptKind,
  },

  /// Add or update a declared submodule and link it into the scripts folder
  Submodule {
    /// Submodule name or link name from the template manifest
    name: String,
  },

  /// Set up and build the analyzer project
  Analyzer,

  /// Run every setup phase in order
  FullSetup {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
  },

  /// Abandon an interrupted install or Full Setup
  Cancel,

  /// Show persisted install state and missing packages
  Status {
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Resume an interrupted install or Full Setup
  Resume,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("templar=debug,templar_lib=debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      if let Some(hint) = e.downcast_ref::<ControllerError>().and_then(ControllerError::hint) {
        print_hint(&hint);
      }
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> Result<()> {
  let mut session = Session::open(cli.project.as_deref())?;

  match cli.command {
    Commands::Folders => cmd::cmd_folders(&mut session),
    Commands::Install => cmd::cmd_install(&mut session),
    Commands::Nuget => cmd::cmd_nuget(&mut session),
    Commands::ConfigFiles => cmd::cmd_config_files(&mut session),
    Commands::LicenseFiles => cmd::cmd_license_files(&mut session),
    Commands::Scripts { kind } => cmd::cmd_scripts(&mut session, kind.into()),
    Commands::Submodule { name } => cmd::cmd_submodule(&mut session, &name, cli.yes),
    Commands::Analyzer => cmd::cmd_analyzer(&mut session, cli.yes),
    Commands::FullSetup { output } => cmd::cmd_full_setup(&mut session, output),
    Commands::Cancel => cmd::cmd_cancel(&mut session),
    Commands::Status { json } => cmd::cmd_status(&session, json),
    Commands::Resume => cmd::cmd_resume(&mut session),
  }
}
