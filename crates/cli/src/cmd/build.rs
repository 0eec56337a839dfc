//! Implementation of the `lumen build` command.
//!
//! Runs one target pipeline, or all of them in order, and reports what was
//! produced. `--clean` removes the build directory's contents instead.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{debug, info};

use lumen_lib::config::Config;
use lumen_lib::lifecycle::{BuildDir, CleanupScope};
use lumen_lib::pipeline::{BuildReport, Pipeline, TargetOutcome};
use lumen_lib::request::BuildRequest;
use lumen_lib::target::{BuildSelection, Target};
use lumen_lib::toolchain::ProcessRunner;

use crate::output::{OutputFormat, format_duration, print_error, print_info, print_json, print_stat, print_success};

#[derive(Debug, Serialize)]
struct BuildSummary {
  success: bool,
  targets: Vec<TargetSummary>,
  duration_ms: u128,
}

#[derive(Debug, Serialize)]
struct TargetSummary {
  target: Target,
  success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  artifact: Option<PathBuf>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  retained: Vec<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error_kind: Option<&'static str>,
}

impl From<&TargetOutcome> for TargetSummary {
  fn from(outcome: &TargetOutcome) -> Self {
    match &outcome.result {
      Ok(output) => TargetSummary {
        target: outcome.target,
        success: true,
        artifact: Some(output.artifact.clone()),
        retained: output.retained.clone(),
        error: None,
        error_kind: None,
      },
      Err(e) => TargetSummary {
        target: outcome.target,
        success: false,
        artifact: None,
        retained: Vec::new(),
        error: Some(e.to_string()),
        error_kind: Some(e.kind()),
      },
    }
  }
}

/// Execute the build command.
///
/// The source file is validated once, before any target starts. With
/// `BuildSelection::All` every target is attempted even after a failure;
/// the command fails if any target did.
pub fn cmd_build(
  config: &Config,
  selection: BuildSelection,
  file: &Path,
  debug: bool,
  output: OutputFormat,
) -> Result<()> {
  let start = Instant::now();
  let targets = selection.targets();
  let request = BuildRequest::new(targets[0], file, debug)?;
  let debug_flag = debug;
  debug!(targets = ?targets, debug = debug_flag, "build requested");

  let runner = ProcessRunner;
  let pipeline = Pipeline::new(config, &runner);

  let report = match selection {
    BuildSelection::One(target) => BuildReport {
      outcomes: vec![TargetOutcome {
        target,
        result: pipeline.build(&request),
      }],
    },
    BuildSelection::All => pipeline.build_all(&request, &targets),
  };

  if output.is_json() {
    let summary = BuildSummary {
      success: report.is_success(),
      targets: report.outcomes.iter().map(TargetSummary::from).collect(),
      duration_ms: start.elapsed().as_millis(),
    };
    print_json(&summary)?;
  } else {
    print_report(&report);
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  let failed: Vec<_> = report.failures().map(|(target, _)| target.as_str()).collect();
  if !failed.is_empty() {
    bail!("build failed for {}", failed.join(", "));
  }
  Ok(())
}

fn print_report(report: &BuildReport) {
  for outcome in &report.outcomes {
    match &outcome.result {
      Ok(built) => {
        print_success(&format!("{}: {}", outcome.target, built.artifact.display()));
        if !built.retained.is_empty() {
          print_stat("Intermediates kept", &built.retained.len().to_string());
        }
      }
      Err(e) => print_error(&format!("{}: {}", outcome.target, e)),
    }
  }
}

/// Execute `build --clean`: remove every intermediate and final artifact.
pub fn cmd_clean(config: &Config, output: OutputFormat) -> Result<()> {
  let dir = BuildDir::new(&config.build_dir);
  let removed = dir.cleanup(CleanupScope::Full, &Target::ALL)?;
  info!(path = %dir.root().display(), removed = removed.len(), "clean complete");

  if output.is_json() {
    print_json(&serde_json::json!({ "build_dir": dir.root(), "removed": removed }))?;
  } else if removed.is_empty() {
    print_info("Nothing to clean");
  } else {
    print_success(&format!("Cleaned {}", dir.root().display()));
    print_stat("Removed", &removed.len().to_string());
  }
  Ok(())
}
