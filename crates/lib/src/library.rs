//! Library bundle assembly.
//!
//! The target toolchains want a single compilation unit, so the library's
//! modules are concatenated, in dependency order, into one Ruby file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::consts::LIBRARY_EPILOGUE;
use crate::error::BuildError;
use crate::util::fs::write_atomic;

const SEPARATOR: &[u8] = b"\n\n";

/// Concatenate every library module into a single bundle.
///
/// Module bytes are copied as-is, whatever their encoding. Fails with
/// [`BuildError::ResourceMissing`] if any module is absent.
pub fn bundle_library(config: &Config) -> Result<Vec<u8>, BuildError> {
  let mut parts = Vec::with_capacity(config.modules.len() + 1);

  for module in &config.modules {
    let path = config.module_path(module);
    let source = read_module(&path)?;
    debug!(module = %module, bytes = source.len(), "read library module");
    parts.push(strip_final_newline(source));
  }

  parts.push(LIBRARY_EPILOGUE.as_bytes().to_vec());

  let mut bundle = parts.join(SEPARATOR);
  bundle.push(b'\n');
  Ok(bundle)
}

/// Assemble the library bundle and write it to `dest`.
///
/// The file at `dest` is either the complete bundle or untouched.
pub fn assemble_library(config: &Config, dest: &Path) -> Result<PathBuf, BuildError> {
  let bundle = bundle_library(config)?;
  write_atomic(dest, &bundle)?;
  info!(path = %dest.display(), modules = config.modules.len(), "assembled library");
  Ok(dest.to_path_buf())
}

fn read_module(path: &Path) -> Result<Vec<u8>, BuildError> {
  fs::read(path).map_err(|e| match e.kind() {
    io::ErrorKind::NotFound => BuildError::ResourceMissing {
      path: path.to_path_buf(),
    },
    _ => BuildError::io(path, e),
  })
}

fn strip_final_newline(mut source: Vec<u8>) -> Vec<u8> {
  if source.ends_with(b"\n") {
    source.pop();
    if source.ends_with(b"\r") {
      source.pop();
    }
  }
  source
}
