//! Shared utilities.
//!
//! Filesystem helpers used across the pipeline, plus test helpers.

pub mod fs;

#[cfg(test)]
pub mod testutil;
