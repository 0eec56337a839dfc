use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::BuildError;
use crate::target::Target;

/// One build of one application source for one target.
///
/// Only constructible for a source file that exists and can be opened, so a
/// pipeline never starts on a bad path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
  target: Target,
  source: PathBuf,
  debug: bool,
}

impl BuildRequest {
  pub fn new(target: Target, source: impl Into<PathBuf>, debug: bool) -> Result<Self, BuildError> {
    let source = source.into();
    validate_source(&source)?;
    Ok(Self { target, source, debug })
  }

  /// The same source and debug setting for another target.
  pub fn for_target(&self, target: Target) -> Self {
    Self {
      target,
      source: self.source.clone(),
      debug: self.debug,
    }
  }

  pub fn target(&self) -> Target {
    self.target
  }

  pub fn source(&self) -> &Path {
    &self.source
  }

  /// Keep intermediates and compile with symbol information.
  pub fn debug(&self) -> bool {
    self.debug
  }
}

fn validate_source(path: &Path) -> Result<(), BuildError> {
  let invalid = |reason: String| BuildError::InvalidRequest {
    path: path.to_path_buf(),
    reason,
  };

  let metadata = std::fs::metadata(path).map_err(|e| invalid(e.to_string()))?;
  if !metadata.is_file() {
    return Err(invalid("not a regular file".to_string()));
  }
  File::open(path).map_err(|e| invalid(e.to_string()))?;
  Ok(())
}
