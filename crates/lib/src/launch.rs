//! Starting previously built artifacts.
//!
//! The launcher only reads the build directory. A target that has not been
//! built is reported without spawning anything.

use tracing::info;

use crate::config::Config;
use crate::error::BuildError;
use crate::lifecycle::BuildDir;
use crate::platform::PlatformOpener;
use crate::target::Target;
use crate::toolchain::{CommandRunner, Phase, Toolchain, ToolchainCommand};

pub struct Launcher<'a> {
  config: &'a Config,
  dir: BuildDir,
  toolchain: Toolchain<'a>,
  opener: PlatformOpener,
}

impl<'a> Launcher<'a> {
  pub fn new(config: &'a Config, runner: &'a dyn CommandRunner, opener: PlatformOpener) -> Self {
    Self {
      config,
      dir: BuildDir::new(&config.build_dir),
      toolchain: Toolchain::new(runner),
      opener,
    }
  }

  /// Start the built artifact for `target`.
  pub fn launch(&self, target: Target) -> Result<(), BuildError> {
    let artifact = self.dir.final_artifact(target);
    if !artifact.exists() {
      return Err(BuildError::ArtifactNotBuilt { target, path: artifact });
    }
    info!(target = %target, artifact = %artifact.display(), "launching");

    for cmd in self.commands(target)? {
      self.toolchain.run(&cmd, Phase::Launch)?;
    }
    Ok(())
  }

  /// The commands that launch `target`, in order.
  pub fn commands(&self, target: Target) -> Result<Vec<ToolchainCommand>, BuildError> {
    let artifact = self.dir.final_artifact(target);
    match target {
      Target::Native => {
        let root = dunce::canonicalize(self.dir.root()).map_err(|e| BuildError::io(self.dir.root(), e))?;
        let executable = dunce::canonicalize(&artifact).map_err(|e| BuildError::io(&artifact, e))?;
        Ok(vec![
          ToolchainCommand::new(executable.to_string_lossy()).current_dir(root),
        ])
      }
      Target::Web => Ok(vec![self.opener.command(&artifact)]),
      Target::Ios | Target::Tvos => {
        let simctl = &self.config.tools.simulator;
        let device = self.config.simulator_device(target);
        Ok(vec![
          ToolchainCommand::new(simctl).args(["simctl", "bootstatus", device, "-b"]),
          ToolchainCommand::new(simctl)
            .args(["simctl", "install", device])
            .path_arg(&artifact),
          ToolchainCommand::new(simctl).args(["simctl", "launch", device, self.config.bundle_id.as_str()]),
        ])
      }
    }
  }
}
