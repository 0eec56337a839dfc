//! External tool invocation.
//!
//! Every compiler, transpiler and Xcode/simulator call goes through a
//! [`CommandRunner`]. Production code uses [`ProcessRunner`]; unit tests use
//! `ScriptedRunner`, which never spawns anything.
//!
//! Invocation is blocking: a step does not start until the previous child
//! has exited.

mod process;
#[cfg(test)]
mod scripted;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::BuildError;
use crate::pipeline::Stage;
use crate::util::fs::write_atomic;

pub use process::ProcessRunner;
#[cfg(test)]
pub use scripted::ScriptedRunner;

/// What a tool invocation was part of, reported when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
  /// A stage of a target build.
  Build(Stage),
  /// Starting a built artifact.
  Launch,
  /// A simulator passthrough command.
  Simulator,
}

impl From<Stage> for Phase {
  fn from(stage: Stage) -> Self {
    Phase::Build(stage)
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Phase::Build(stage) => write!(f, "{}", stage),
      Phase::Launch => f.write_str("launch"),
      Phase::Simulator => f.write_str("simulator"),
    }
  }
}

/// What happens to a child's standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdoutMode {
  /// Passed through to the user unmodified.
  #[default]
  Inherit,
  /// Collected and written to the command's output path.
  Capture,
  /// Thrown away (stderr too). Used for availability probes.
  Discard,
}

/// One external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainCommand {
  pub program: String,
  pub args: Vec<String>,
  /// Working directory, or the current directory when `None`.
  pub cwd: Option<PathBuf>,
  /// File the command is expected to produce.
  pub output: Option<PathBuf>,
  pub stdout: StdoutMode,
}

impl ToolchainCommand {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      output: None,
      stdout: StdoutMode::Inherit,
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  /// Append a path argument.
  pub fn path_arg(self, path: &Path) -> Self {
    self.arg(path.to_string_lossy())
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  /// Record the file the tool writes itself.
  pub fn produces(mut self, path: impl Into<PathBuf>) -> Self {
    self.output = Some(path.into());
    self
  }

  /// Capture standard output into `path`.
  pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
    self.output = Some(path.into());
    self.stdout = StdoutMode::Capture;
    self
  }

  pub fn discard_output(mut self) -> Self {
    self.stdout = StdoutMode::Discard;
    self
  }
}

impl fmt::Display for ToolchainCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program)?;
    for arg in &self.args {
      if arg.is_empty() || arg.contains(char::is_whitespace) {
        write!(f, " {:?}", arg)?;
      } else {
        write!(f, " {}", arg)?;
      }
    }
    Ok(())
  }
}

/// Result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  /// Exit code, `None` when the child was killed by a signal.
  pub code: Option<i32>,
  /// Standard output, only populated in [`StdoutMode::Capture`].
  pub stdout: Vec<u8>,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }
}

/// Runs external commands to completion.
pub trait CommandRunner {
  /// Run `cmd` and wait for it to exit.
  ///
  /// An `Err` means the program could not be started at all.
  fn run(&self, cmd: &ToolchainCommand) -> io::Result<CommandOutput>;
}

/// Pipeline-facing wrapper that turns exit statuses into [`BuildError`]s.
pub struct Toolchain<'r> {
  runner: &'r dyn CommandRunner,
}

impl<'r> Toolchain<'r> {
  pub fn new(runner: &'r dyn CommandRunner) -> Self {
    Self { runner }
  }

  /// Check that `program` can be started, without touching the filesystem.
  pub fn probe(&self, program: &str) -> Result<(), BuildError> {
    let cmd = probe_command(program);
    debug!(cmd = %cmd, "probing tool");
    match self.runner.run(&cmd) {
      Ok(output) if output.success() => Ok(()),
      Ok(output) => {
        debug!(program, code = ?output.code, "probe exited unsuccessfully");
        Err(BuildError::ToolNotFound {
          tool: program.to_string(),
        })
      }
      Err(e) => {
        debug!(program, error = %e, "probe could not start");
        Err(BuildError::ToolNotFound {
          tool: program.to_string(),
        })
      }
    }
  }

  /// Run `cmd` as part of `phase`, failing on a non-zero exit.
  pub fn run(&self, cmd: &ToolchainCommand, phase: impl Into<Phase>) -> Result<(), BuildError> {
    let phase = phase.into();
    info!(phase = %phase, cmd = %cmd, "running");

    let output = match self.runner.run(cmd) {
      Ok(output) => output,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        return Err(BuildError::ToolNotFound {
          tool: cmd.program.clone(),
        });
      }
      Err(e) => return Err(BuildError::io(&cmd.program, e)),
    };

    if !output.success() {
      return Err(BuildError::ExternalToolFailure {
        program: cmd.program.clone(),
        code: output.code,
        phase,
      });
    }

    if let (StdoutMode::Capture, Some(path)) = (cmd.stdout, &cmd.output) {
      write_atomic(path, &output.stdout)?;
      debug!(path = %path.display(), bytes = output.stdout.len(), "captured output");
    }

    Ok(())
  }
}

/// The cheapest invocation that proves `program` exists.
fn probe_command(program: &str) -> ToolchainCommand {
  let flag = if Path::new(program).file_stem().is_some_and(|s| s == "xcodebuild") {
    "-version"
  } else {
    "--version"
  };
  ToolchainCommand::new(program).arg(flag).discard_output()
}
