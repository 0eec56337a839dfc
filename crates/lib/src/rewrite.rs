//! Application source rewriting.
//!
//! The library bundle is compiled in the same unit as the application, so the
//! application's own `require 'lumen'` is dropped before the two are combined.
//! Removal is unconditional.
//!
//! Sources are handled as bytes. Ruby files may declare a non-UTF-8 encoding,
//! and only the ASCII shape of a line decides whether it is an import.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::BuildError;

/// Read `source_path` and drop every line that only requires `library`.
pub fn strip_library_import(source_path: &Path, library: &str) -> Result<Vec<u8>, BuildError> {
  let source = fs::read(source_path).map_err(|e| BuildError::io(source_path, e))?;
  let rewritten = strip_library_import_bytes(&source, library);
  debug!(
    path = %source_path.display(),
    removed_bytes = source.len() - rewritten.len(),
    "stripped library import"
  );
  Ok(rewritten)
}

/// Drop every line of `source` that only requires `library`. All other lines,
/// including their terminators, are kept byte for byte.
pub fn strip_library_import_bytes(source: &[u8], library: &str) -> Vec<u8> {
  source
    .split_inclusive(|&b| b == b'\n')
    .filter(|line| !is_library_import(line, library))
    .flatten()
    .copied()
    .collect()
}

/// `require 'lib'`, `require "lib"`, `require('lib')` or `require("lib")`,
/// optionally indented and optionally followed by `;` and/or a comment.
fn is_library_import(line: &[u8], library: &str) -> bool {
  // Non-UTF-8 bytes become U+FFFD, which never matches the ASCII syntax below.
  let line = String::from_utf8_lossy(line);

  let Some(rest) = line.trim_start().strip_prefix("require") else {
    return false;
  };

  let (rest, parenthesised) = match rest.strip_prefix('(') {
    Some(inner) => (inner.trim_start(), true),
    None if rest.starts_with(char::is_whitespace) => (rest.trim_start(), false),
    None => return false,
  };

  let Some(mut rest) = strip_quoted(rest, library).map(str::trim_start) else {
    return false;
  };

  if parenthesised {
    match rest.strip_prefix(')') {
      Some(after) => rest = after.trim_start(),
      None => return false,
    }
  }
  if let Some(after) = rest.strip_prefix(';') {
    rest = after.trim_start();
  }

  rest.is_empty() || rest.starts_with('#')
}

/// The text after `'name'` or `"name"` at the start of `s`.
fn strip_quoted<'s>(s: &'s str, name: &str) -> Option<&'s str> {
  ['\'', '"']
    .into_iter()
    .find_map(|quote| s.strip_prefix(quote)?.strip_prefix(name)?.strip_prefix(quote))
}
