//! Simulator passthrough commands.
//!
//! Each action maps onto one or two `xcrun simctl` (or `open`) invocations
//! whose output goes straight to the user.

use std::path::PathBuf;

use crate::config::Config;
use crate::error::BuildError;
use crate::toolchain::{CommandRunner, Phase, Toolchain, ToolchainCommand};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatorAction {
  /// Every available device.
  List,
  /// Devices that are currently booted.
  Booted,
  /// Boot a device by name and bring up the Simulator app.
  Open(String),
  /// Install an app bundle on the booted device.
  Install(PathBuf),
  /// Launch a bundle identifier on the booted device.
  Launch(String),
  /// Stream the booted device's log.
  Log { errors_only: bool },
}

impl SimulatorAction {
  pub fn commands(&self, config: &Config) -> Vec<ToolchainCommand> {
    let simctl = || ToolchainCommand::new(&config.tools.simulator).arg("simctl");
    match self {
      SimulatorAction::List => vec![simctl().args(["list", "devices", "available"])],
      SimulatorAction::Booted => vec![simctl().args(["list", "devices", "booted"])],
      SimulatorAction::Open(name) => vec![
        simctl().args(["bootstatus", name.as_str(), "-b"]),
        ToolchainCommand::new("open").args(["-a", "Simulator"]),
      ],
      SimulatorAction::Install(path) => vec![simctl().args(["install", "booted"]).path_arg(path)],
      SimulatorAction::Launch(bundle_id) => vec![simctl().args(["launch", "booted", bundle_id.as_str()])],
      SimulatorAction::Log { errors_only } => {
        let cmd = simctl().args(["spawn", "booted", "log", "stream", "--level", "debug"]);
        if *errors_only {
          vec![cmd.args(["--predicate", "messageType == error"])]
        } else {
          vec![cmd]
        }
      }
    }
  }
}

/// Run `action`, stopping at the first failing command.
pub fn run_simulator(config: &Config, runner: &dyn CommandRunner, action: &SimulatorAction) -> Result<(), BuildError> {
  let toolchain = Toolchain::new(runner);
  toolchain.probe(&config.tools.simulator)?;
  for cmd in action.commands(config) {
    toolchain.run(&cmd, Phase::Simulator)?;
  }
  Ok(())
}
