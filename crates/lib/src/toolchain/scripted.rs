//! A [`CommandRunner`] that never spawns anything.
//!
//! Every command is recorded. By default each one exits 0 and, when it names
//! an output file, the runner writes a one-line stand-in for what the real
//! tool would have produced. Programs can be scripted to be absent or to fail.

use std::cell::RefCell;
use std::collections::HashSet;
use std::io;

use super::{CommandOutput, CommandRunner, StdoutMode, ToolchainCommand};

#[derive(Debug, Clone)]
struct FailureRule {
  program: String,
  /// Only commands with an argument containing this text fail.
  needle: Option<String>,
  code: i32,
}

#[derive(Debug, Default)]
pub struct ScriptedRunner {
  missing: HashSet<String>,
  failures: Vec<FailureRule>,
  calls: RefCell<Vec<ToolchainCommand>>,
}

impl ScriptedRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Behave as if `program` is not installed.
  pub fn missing(mut self, program: &str) -> Self {
    self.missing.insert(program.to_string());
    self
  }

  /// Every invocation of `program` exits with `code`, probes included.
  pub fn fail(mut self, program: &str, code: i32) -> Self {
    self.failures.push(FailureRule {
      program: program.to_string(),
      needle: None,
      code,
    });
    self
  }

  /// Invocations of `program` with an argument containing `needle` exit
  /// with `code`; everything else succeeds.
  pub fn fail_matching(mut self, program: &str, needle: &str, code: i32) -> Self {
    self.failures.push(FailureRule {
      program: program.to_string(),
      needle: Some(needle.to_string()),
      code,
    });
    self
  }

  /// Every command run so far, in order.
  pub fn calls(&self) -> Vec<ToolchainCommand> {
    self.calls.borrow().clone()
  }

  /// Commands run so far, excluding availability probes.
  pub fn steps(&self) -> Vec<ToolchainCommand> {
    self
      .calls
      .borrow()
      .iter()
      .filter(|cmd| cmd.stdout != StdoutMode::Discard)
      .cloned()
      .collect()
  }

  fn exit_code(&self, cmd: &ToolchainCommand) -> i32 {
    self
      .failures
      .iter()
      .find(|rule| {
        rule.program == cmd.program
          && rule
            .needle
            .as_ref()
            .is_none_or(|needle| cmd.args.iter().any(|arg| arg.contains(needle.as_str())))
      })
      .map(|rule| rule.code)
      .unwrap_or(0)
  }
}

impl CommandRunner for ScriptedRunner {
  fn run(&self, cmd: &ToolchainCommand) -> io::Result<CommandOutput> {
    self.calls.borrow_mut().push(cmd.clone());

    if self.missing.contains(&cmd.program) {
      return Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: command not found", cmd.program),
      ));
    }

    let code = self.exit_code(cmd);
    if code != 0 {
      return Ok(CommandOutput {
        code: Some(code),
        stdout: Vec::new(),
      });
    }

    let produced = format!("/* {} */\n", cmd).into_bytes();
    match (cmd.stdout, &cmd.output) {
      (StdoutMode::Capture, Some(_)) => Ok(CommandOutput {
        code: Some(0),
        stdout: produced,
      }),
      (_, Some(path)) => {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
          std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, produced)?;
        Ok(CommandOutput {
          code: Some(0),
          stdout: Vec::new(),
        })
      }
      (_, None) => Ok(CommandOutput {
        code: Some(0),
        stdout: Vec::new(),
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn records_calls_in_order() {
    let runner = ScriptedRunner::new();
    runner.run(&ToolchainCommand::new("a")).unwrap();
    runner.run(&ToolchainCommand::new("b").discard_output()).unwrap();
    let programs: Vec<_> = runner.calls().into_iter().map(|c| c.program).collect();
    assert_eq!(programs, vec!["a", "b"]);
    assert_eq!(runner.steps().len(), 1);
  }

  #[test]
  fn needle_limits_failure_to_matching_commands() {
    let runner = ScriptedRunner::new().fail_matching("opal", "--compile", 1);
    let probe = runner.run(&ToolchainCommand::new("opal").arg("--version")).unwrap();
    let compile = runner.run(&ToolchainCommand::new("opal").arg("--compile")).unwrap();
    assert!(probe.success());
    assert_eq!(compile.code, Some(1));
  }

  #[test]
  fn writes_declared_output_file() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("nested").join("game");
    let runner = ScriptedRunner::new();
    runner.run(&ToolchainCommand::new("cc").produces(&out)).unwrap();
    assert!(out.exists());
  }
}
