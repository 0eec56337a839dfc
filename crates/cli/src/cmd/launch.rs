//! Implementation of the `lumen launch` command.

use anyhow::Result;

use lumen_lib::config::Config;
use lumen_lib::launch::Launcher;
use lumen_lib::platform::PlatformOpener;
use lumen_lib::target::Target;
use lumen_lib::toolchain::ProcessRunner;

use crate::output::print_info;

/// Start the game previously built for `target`.
///
/// Fails without spawning anything when the target has not been built.
pub fn cmd_launch(config: &Config, target: Target) -> Result<()> {
  let runner = ProcessRunner;
  let launcher = Launcher::new(config, &runner, PlatformOpener::detect());

  print_info(&format!("Launching {}", target));
  launcher.launch(target)?;
  Ok(())
}
