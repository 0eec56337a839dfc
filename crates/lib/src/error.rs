//! Errors raised while building or launching an application.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::target::Target;
use crate::toolchain::Phase;

/// Every failure is terminal for the pipeline that raised it.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The source file is missing or unreadable. Raised before any side effect.
  #[error("invalid source file {}: {reason}", path.display())]
  InvalidRequest { path: PathBuf, reason: String },

  /// A required external tool is not on PATH.
  #[error("required tool not found: {tool}")]
  ToolNotFound { tool: String },

  /// A library module (or other installed library file) is absent.
  #[error("library installation is incomplete, missing {}", path.display())]
  ResourceMissing { path: PathBuf },

  /// A framework an Apple target links against is absent.
  #[error("{target} platform dependency missing: {}", path.display())]
  PlatformDependencyMissing { target: Target, path: PathBuf },

  /// A spawned process exited unsuccessfully.
  #[error("{program} failed during {phase} with {}", describe_code(*code))]
  ExternalToolFailure {
    program: String,
    code: Option<i32>,
    phase: Phase,
  },

  /// Launch was requested before the target was built.
  #[error("{target} has not been built yet (expected {})", path.display())]
  ArtifactNotBuilt { target: Target, path: PathBuf },

  #[error("io error at {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl BuildError {
  pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    BuildError::Io {
      path: path.into(),
      source,
    }
  }

  /// Short machine-readable name of the failure class.
  pub fn kind(&self) -> &'static str {
    match self {
      BuildError::InvalidRequest { .. } => "invalid_request",
      BuildError::ToolNotFound { .. } => "tool_not_found",
      BuildError::ResourceMissing { .. } => "resource_missing",
      BuildError::PlatformDependencyMissing { .. } => "platform_dependency_missing",
      BuildError::ExternalToolFailure { .. } => "external_tool_failure",
      BuildError::ArtifactNotBuilt { .. } => "artifact_not_built",
      BuildError::Io { .. } => "io",
    }
  }
}

fn describe_code(code: Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "no exit code (terminated by signal)".to_string(),
  }
}
