//! Artifact combination.
//!
//! A combined platform file is the concatenation of an explicit, ordered list
//! of parts. The combiner never reorders parts; symbol resolution in the
//! downstream toolchain depends on the order the pipeline declares.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::BuildError;
use crate::util::fs::{persist, temp_sibling};

/// Where a part's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartSource {
  File(PathBuf),
  Text(String),
}

/// One section of a combined file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
  /// Human-readable name used in logs.
  pub label: String,
  /// Lines written immediately before the content, e.g. `#define`s.
  pub markers: Vec<String>,
  pub source: PartSource,
}

impl Part {
  pub fn file(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      label: label.into(),
      markers: Vec::new(),
      source: PartSource::File(path.into()),
    }
  }

  pub fn text(label: impl Into<String>, text: impl Into<String>) -> Self {
    Self {
      label: label.into(),
      markers: Vec::new(),
      source: PartSource::Text(text.into()),
    }
  }

  pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
    self.markers.push(marker.into());
    self
  }
}

/// The ordered parts of one combined file and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinePlan {
  pub dest: PathBuf,
  pub parts: Vec<Part>,
}

impl CombinePlan {
  pub fn new(dest: impl Into<PathBuf>) -> Self {
    Self {
      dest: dest.into(),
      parts: Vec::new(),
    }
  }

  pub fn part(mut self, part: Part) -> Self {
    self.parts.push(part);
    self
  }

  pub fn labels(&self) -> Vec<&str> {
    self.parts.iter().map(|p| p.label.as_str()).collect()
  }
}

/// Write every part of `plan`, in order, to `plan.dest`.
///
/// Each part is its marker lines (if any) followed by its content, with a
/// trailing newline added when the content lacks one. Nothing is written to
/// `plan.dest` unless every part could be read.
pub fn combine(plan: &CombinePlan) -> Result<PathBuf, BuildError> {
  let mut file = temp_sibling(&plan.dest)?;

  for part in &plan.parts {
    let content = read_part(part)?;
    let mut chunk = Vec::with_capacity(content.len() + 64);

    for marker in &part.markers {
      chunk.extend_from_slice(marker.as_bytes());
      chunk.push(b'\n');
    }
    chunk.extend_from_slice(&content);
    if !content.is_empty() && !content.ends_with(b"\n") {
      chunk.push(b'\n');
    }

    file.write_all(&chunk).map_err(|e| BuildError::io(&plan.dest, e))?;
    debug!(part = %part.label, bytes = content.len(), "appended part");
  }

  persist(file, &plan.dest)?;
  info!(path = %plan.dest.display(), parts = plan.parts.len(), "combined");
  Ok(plan.dest.clone())
}

fn read_part(part: &Part) -> Result<Vec<u8>, BuildError> {
  match &part.source {
    PartSource::Text(text) => Ok(text.clone().into_bytes()),
    PartSource::File(path) => read_file(path),
  }
}

fn read_file(path: &Path) -> Result<Vec<u8>, BuildError> {
  fs::read(path).map_err(|e| match e.kind() {
    std::io::ErrorKind::NotFound => BuildError::ResourceMissing {
      path: path.to_path_buf(),
    },
    _ => BuildError::io(path, e),
  })
}
