mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lumen_lib::config::Config;
use lumen_lib::simulator::SimulatorAction;
use lumen_lib::target::{BuildSelection, Target};

use crate::output::{OutputFormat, print_error};

/// lumen - build and run Lumen games on desktop, web, iOS and tvOS
#[derive(Parser)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
struct Cli {
  /// Print version
  #[arg(short = 'v', long = "version", action = ArgAction::Version)]
  version: Option<bool>,

  /// Enable verbose output
  #[arg(long, global = true)]
  verbose: bool,

  /// Build directory (default: ./build, or LUMEN_BUILD_DIR)
  #[arg(long, global = true, value_name = "DIR")]
  build_dir: Option<PathBuf>,

  /// Installed Lumen library (default: LUMEN_LIBRARY_ROOT, then the user data directory)
  #[arg(long, global = true, value_name = "DIR")]
  library_root: Option<PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a game for one target or all of them
  Build(BuildArgs),

  /// Run a previously built game
  Launch(LaunchArgs),

  /// Control the Apple simulator
  Simulator(SimulatorArgs),
}

#[derive(Args)]
#[command(group(
  ArgGroup::new("selection")
    .required(true)
    .args(["native", "web", "ios", "tvos", "all", "clean"])
))]
struct BuildArgs {
  /// Build a desktop executable
  #[arg(long)]
  native: bool,

  /// Build a browser bundle
  #[arg(long)]
  web: bool,

  /// Build an iOS simulator app
  #[arg(long)]
  ios: bool,

  /// Build a tvOS simulator app
  #[arg(long)]
  tvos: bool,

  /// Build every target, continuing past failures
  #[arg(long)]
  all: bool,

  /// Remove every build artifact instead of building
  #[arg(long, conflicts_with_all = ["file", "debug"])]
  clean: bool,

  /// Game source file
  #[arg(required_unless_present = "clean")]
  file: Option<PathBuf>,

  /// Keep intermediates and compile with debug info
  #[arg(long)]
  debug: bool,

  /// Output format
  #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
  output: OutputFormat,
}

impl BuildArgs {
  fn selection(&self) -> Option<BuildSelection> {
    if self.all {
      return Some(BuildSelection::All);
    }
    target_flag(self.native, self.web, self.ios, self.tvos).map(BuildSelection::One)
  }
}

#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["native", "web", "ios", "tvos"])))]
struct LaunchArgs {
  /// Run the desktop executable
  #[arg(long)]
  native: bool,

  /// Open the browser bundle
  #[arg(long)]
  web: bool,

  /// Install and launch on the iOS simulator
  #[arg(long)]
  ios: bool,

  /// Install and launch on the tvOS simulator
  #[arg(long)]
  tvos: bool,
}

#[derive(Args)]
#[command(group(
  ArgGroup::new("action")
    .required(true)
    .args(["list", "booted", "open", "install", "launch", "log", "log_errors"])
))]
struct SimulatorArgs {
  /// List available devices
  #[arg(long)]
  list: bool,

  /// List booted devices
  #[arg(long)]
  booted: bool,

  /// Boot a device and show the Simulator app
  #[arg(long, value_name = "NAME")]
  open: Option<String>,

  /// Install an app bundle on the booted device
  #[arg(long, value_name = "PATH")]
  install: Option<PathBuf>,

  /// Launch a bundle identifier on the booted device
  #[arg(long, value_name = "BUNDLE_ID")]
  launch: Option<String>,

  /// Stream the booted device's log
  #[arg(long)]
  log: bool,

  /// Stream only error messages from the booted device's log
  #[arg(long)]
  log_errors: bool,
}

impl SimulatorArgs {
  fn action(self) -> Option<SimulatorAction> {
    if self.list {
      Some(SimulatorAction::List)
    } else if self.booted {
      Some(SimulatorAction::Booted)
    } else if let Some(name) = self.open {
      Some(SimulatorAction::Open(name))
    } else if let Some(path) = self.install {
      Some(SimulatorAction::Install(path))
    } else if let Some(id) = self.launch {
      Some(SimulatorAction::Launch(id))
    } else if self.log || self.log_errors {
      Some(SimulatorAction::Log {
        errors_only: self.log_errors,
      })
    } else {
      None
    }
  }
}

fn target_flag(native: bool, web: bool, ios: bool, tvos: bool) -> Option<Target> {
  [(native, Target::Native), (web, Target::Web), (ios, Target::Ios), (tvos, Target::Tvos)]
    .into_iter()
    .find_map(|(set, target)| set.then_some(target))
}

fn init_logging(verbose: bool) {
  let filter = if verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .without_time()
    .with_writer(std::io::stderr)
    .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
  let mut config = Config::from_env(cli.library_root.clone()).context("Failed to load configuration")?;
  if let Some(dir) = &cli.build_dir {
    config = config.with_build_dir(dir);
  }
  Ok(config)
}

fn run(cli: Cli) -> Result<()> {
  let config = load_config(&cli)?;

  match cli.command {
    Commands::Build(args) => {
      if args.clean {
        return cmd::cmd_clean(&config, args.output);
      }
      let selection = args.selection().context("no build target selected")?;
      let file = args.file.as_deref().context("no source file given")?;
      cmd::cmd_build(&config, selection, file, args.debug, args.output)
    }
    Commands::Launch(args) => {
      let target = target_flag(args.native, args.web, args.ios, args.tvos).context("no launch target selected")?;
      cmd::cmd_launch(&config, target)
    }
    Commands::Simulator(args) => {
      let action = args.action().context("no simulator action selected")?;
      cmd::cmd_simulator(&config, &action)
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match run(cli) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
