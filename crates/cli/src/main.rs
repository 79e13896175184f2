mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_configure, cmd_locate, cmd_show, cmd_units};
use nsbuild_lib::project::ProjectOverrides;
use output::{OutputFormat, print_error};

/// nsb - namespace-driven build configuration
#[derive(Parser)]
#[command(name = "nsb")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Args)]
struct Overrides {
  /// Directory whose layout defines the namespaces (default: <root>/src)
  #[arg(long)]
  namespace_root: Option<PathBuf>,

  /// Directory receiving generated files (default: <root>/build)
  #[arg(long)]
  output_dir: Option<PathBuf>,
}

impl From<Overrides> for ProjectOverrides {
  fn from(overrides: Overrides) -> Self {
    ProjectOverrides {
      namespace_root: overrides.namespace_root,
      output_dir: overrides.output_dir,
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Configure a project and write its build graph
  Configure {
    /// Project directory or project.lua (default: current directory)
    #[arg(default_value = ".")]
    project: PathBuf,

    #[command(flatten)]
    overrides: Overrides,
  },

  /// List the units a configuration pass declares
  Units {
    /// Project directory or project.lua (default: current directory)
    #[arg(default_value = ".")]
    project: PathBuf,

    #[command(flatten)]
    overrides: Overrides,
  },

  /// Show one unit and its effective usage
  Show {
    /// Alias or raw name of the unit
    reference: String,

    /// Project directory or project.lua
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    #[command(flatten)]
    overrides: Overrides,
  },

  /// Print the directory that must declare a reference
  Locate {
    /// Reference such as Proj::Core::Math
    reference: String,

    /// Project name the reference is interpreted against
    #[arg(short, long)]
    name: String,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let format = cli.output;
  let result = match cli.command {
    Commands::Configure { project, overrides } => cmd_configure(&project, &overrides.into(), format),
    Commands::Units { project, overrides } => cmd_units(&project, &overrides.into(), format),
    Commands::Show {
      reference,
      project,
      overrides,
    } => cmd_show(&reference, &project, &overrides.into(), format),
    Commands::Locate { reference, name } => cmd_locate(&reference, &name, format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{e:#}"));
      ExitCode::FAILURE
    }
  }
}
