use std::io;
use std::process::{Command, Stdio};

use tracing::debug;

use super::{CommandOutput, CommandRunner, StdoutMode, ToolchainCommand};

/// Spawns real child processes and blocks until they exit.
///
/// stderr is always passed through to the user, except for probes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
  fn run(&self, cmd: &ToolchainCommand) -> io::Result<CommandOutput> {
    let mut command = Command::new(&cmd.program);
    command.args(&cmd.args);

    if let Some(cwd) = &cmd.cwd {
      command.current_dir(cwd);
    }

    match cmd.stdout {
      StdoutMode::Inherit => {
        command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
      }
      StdoutMode::Capture => {
        command.stdout(Stdio::piped()).stderr(Stdio::inherit());
      }
      StdoutMode::Discard => {
        command.stdout(Stdio::null()).stderr(Stdio::null());
      }
    }

    debug!(program = %cmd.program, cwd = ?cmd.cwd, "spawning process");

    let output = command.stdin(Stdio::inherit()).output()?;

    debug!(program = %cmd.program, code = ?output.status.code(), "process exited");

    Ok(CommandOutput {
      code: output.status.code(),
      stdout: output.stdout,
    })
  }
}
