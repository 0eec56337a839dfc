//! Filesystem helpers shared by the pipeline stages.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::BuildError;

/// Write `contents` to `path` so that readers see either the old file or the
/// complete new one, never a partial write.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), BuildError> {
  let mut file = temp_sibling(path)?;
  file.write_all(contents).map_err(|e| BuildError::io(path, e))?;
  persist(file, path)
}

/// A temp file in the same directory as `path`, so the final rename does not
/// cross filesystems.
pub fn temp_sibling(path: &Path) -> Result<NamedTempFile, BuildError> {
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  NamedTempFile::new_in(dir).map_err(|e| BuildError::io(dir, e))
}

pub fn persist(file: NamedTempFile, path: &Path) -> Result<(), BuildError> {
  file.persist(path).map_err(|e| BuildError::io(path, e.error))?;
  Ok(())
}

/// Remove a file or directory tree. Returns whether anything was removed;
/// an absent path is not an error.
pub fn remove_path(path: &Path) -> io::Result<bool> {
  let metadata = match fs::symlink_metadata(path) {
    Ok(metadata) => metadata,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
    Err(e) => return Err(e),
  };

  let result = if metadata.is_dir() {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  };

  match result {
    Ok(()) => Ok(true),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
    Err(e) => Err(e),
  }
}

/// Recursively copy the directory `from` to `to`, replacing `to` if present.
pub fn copy_dir(from: &Path, to: &Path) -> Result<(), BuildError> {
  remove_path(to).map_err(|e| BuildError::io(to, e))?;

  for entry in WalkDir::new(from).sort_by_file_name() {
    let entry = entry.map_err(|e| {
      let path = e.path().unwrap_or(from).to_path_buf();
      BuildError::io(path, io::Error::other(e.to_string()))
    })?;
    let rel = entry.path().strip_prefix(from).unwrap_or(entry.path());
    let dest = to.join(rel);

    if entry.file_type().is_dir() {
      fs::create_dir_all(&dest).map_err(|e| BuildError::io(&dest, e))?;
    } else {
      fs::copy(entry.path(), &dest).map_err(|e| BuildError::io(&dest, e))?;
    }
  }

  Ok(())
}
