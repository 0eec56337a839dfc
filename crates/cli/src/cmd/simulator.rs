//! Implementation of the `lumen simulator` command.

use anyhow::{Context, Result};

use lumen_lib::config::Config;
use lumen_lib::simulator::{SimulatorAction, run_simulator};
use lumen_lib::toolchain::ProcessRunner;

pub fn cmd_simulator(config: &Config, action: &SimulatorAction) -> Result<()> {
  run_simulator(config, &ProcessRunner, action).context("Simulator command failed")
}
