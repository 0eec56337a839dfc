//! Build directory lifecycle.
//!
//! Every file a pipeline writes is listed in that target's artifact table and
//! classified as intermediate or final. Cleanup works from the tables only, so
//! nothing outside them is ever deleted.
//!
//! All targets share the intermediate names in [`SHARED_INTERMEDIATES`] and
//! the compiled C units, so two pipelines must never run against the same
//! build directory at the same time.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::consts::XCODE_PROJECT;
use crate::error::BuildError;
use crate::target::Target;
use crate::util::fs::remove_path;

pub const LIBRARY_BUNDLE: &str = "lumen.rb";
pub const REWRITTEN_SOURCE: &str = "main.rb";
pub const LIBRARY_C: &str = "lumen.c";
pub const SOURCE_C: &str = "main.c";
pub const NATIVE_COMBINED: &str = "native.c";
pub const TRANSPILER_RUNTIME: &str = "opal.js";
pub const LIBRARY_JS: &str = "lumen.js";
pub const INTEROP_JS: &str = "interop.js";
pub const SOURCE_JS: &str = "main.js";
pub const WEB_BUNDLE: &str = "game.js";
pub const WEB_ENTRY: &str = "index.html";
/// Combined file inside an Apple project copy.
pub const APPLE_COMBINED: &str = "game.c";
/// Xcode `SYMROOT`, relative to the project copy.
pub const APPLE_PRODUCTS: &str = "out";

#[cfg(windows)]
pub const EXECUTABLE: &str = "game.exe";
#[cfg(not(windows))]
pub const EXECUTABLE: &str = "game";

pub const SHARED_INTERMEDIATES: &[&str] = &[LIBRARY_BUNDLE, REWRITTEN_SOURCE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
  /// Only needed while the pipeline runs.
  Intermediate,
  /// What the user asked for; survives intermediate cleanup.
  Final,
}

/// A file or directory inside the build directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Artifact {
  pub name: &'static str,
  pub kind: ArtifactKind,
}

const fn intermediate(name: &'static str) -> Artifact {
  Artifact {
    name,
    kind: ArtifactKind::Intermediate,
  }
}

const fn final_(name: &'static str) -> Artifact {
  Artifact {
    name,
    kind: ArtifactKind::Final,
  }
}

/// Every artifact a target's pipeline produces.
pub fn artifacts(target: Target) -> Vec<Artifact> {
  let mut table: Vec<Artifact> = SHARED_INTERMEDIATES.iter().copied().map(intermediate).collect();
  match target {
    Target::Native => table.extend([
      intermediate(LIBRARY_C),
      intermediate(SOURCE_C),
      intermediate(NATIVE_COMBINED),
      final_(EXECUTABLE),
    ]),
    Target::Web => table.extend([
      intermediate(TRANSPILER_RUNTIME),
      intermediate(LIBRARY_JS),
      intermediate(INTEROP_JS),
      intermediate(SOURCE_JS),
      final_(WEB_BUNDLE),
      final_(WEB_ENTRY),
    ]),
    Target::Ios | Target::Tvos => table.extend([
      intermediate(LIBRARY_C),
      intermediate(SOURCE_C),
      final_(target.as_str()),
    ]),
  }
  table
}

/// How much of the build directory to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupScope {
  /// Intermediate artifacts of the targets that ran.
  Intermediate,
  /// Everything, for every target, then the directory itself if empty.
  Full,
}

/// The directory holding every intermediate and final artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDir {
  root: PathBuf,
}

impl BuildDir {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn exists(&self) -> bool {
    self.root.is_dir()
  }

  /// Create the directory. Safe to call when it already exists.
  pub fn ensure(&self) -> Result<(), BuildError> {
    fs::create_dir_all(&self.root).map_err(|e| BuildError::io(&self.root, e))?;
    debug!(path = %self.root.display(), "build directory ready");
    Ok(())
  }

  pub fn path(&self, name: &str) -> PathBuf {
    self.root.join(name)
  }

  /// The Xcode project copy for an Apple target.
  pub fn project_dir(&self, target: Target) -> PathBuf {
    self.path(target.as_str())
  }

  /// The thing [`crate::launch`] starts: the executable, the HTML entry
  /// point or the simulator app bundle.
  pub fn final_artifact(&self, target: Target) -> PathBuf {
    match target {
      Target::Native => self.path(EXECUTABLE),
      Target::Web => self.path(WEB_ENTRY),
      Target::Ios | Target::Tvos => {
        let sdk = target.simulator_sdk().unwrap_or_default();
        self
          .project_dir(target)
          .join(APPLE_PRODUCTS)
          .join(format!("Debug-{}", sdk))
          .join(format!("{}.app", XCODE_PROJECT))
      }
    }
  }

  pub fn intermediates(&self, target: Target) -> Vec<PathBuf> {
    self.paths_of(target, Some(ArtifactKind::Intermediate))
  }

  pub fn finals(&self, target: Target) -> Vec<PathBuf> {
    self.paths_of(target, Some(ArtifactKind::Final))
  }

  /// Remove artifacts. Returns the paths that actually existed and were removed.
  ///
  /// `targets` selects whose intermediates go for
  /// [`CleanupScope::Intermediate`]; [`CleanupScope::Full`] ignores it and
  /// covers every target. Missing files are skipped, so repeating a cleanup
  /// is harmless.
  pub fn cleanup(&self, scope: CleanupScope, targets: &[Target]) -> Result<Vec<PathBuf>, BuildError> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    match scope {
      CleanupScope::Intermediate => {
        for target in targets {
          candidates.extend(self.intermediates(*target));
        }
      }
      CleanupScope::Full => {
        for target in Target::ALL {
          candidates.extend(self.paths_of(target, None));
        }
      }
    }
    candidates.sort();
    candidates.dedup();

    let mut removed = Vec::new();
    for path in candidates {
      if remove_path(&path).map_err(|e| BuildError::io(&path, e))? {
        debug!(path = %path.display(), "removed");
        removed.push(path);
      }
    }

    if scope == CleanupScope::Full {
      self.remove_root_if_empty()?;
    }

    info!(scope = ?scope, removed = removed.len(), "cleaned build directory");
    Ok(removed)
  }

  fn paths_of(&self, target: Target, kind: Option<ArtifactKind>) -> Vec<PathBuf> {
    artifacts(target)
      .into_iter()
      .filter(|a| kind.is_none_or(|k| a.kind == k))
      .map(|a| self.path(a.name))
      .collect()
  }

  fn remove_root_if_empty(&self) -> Result<(), BuildError> {
    let mut entries = match fs::read_dir(&self.root) {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
      Err(e) => return Err(BuildError::io(&self.root, e)),
    };
    if entries.next().is_none() {
      fs::remove_dir(&self.root).map_err(|e| BuildError::io(&self.root, e))?;
      debug!(path = %self.root.display(), "removed empty build directory");
    }
    Ok(())
  }
}
