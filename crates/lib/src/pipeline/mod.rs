//! Target build pipelines.
//!
//! Every target runs the same fixed sequence of stages:
//!
//! ```text
//! Init -> AssembleLibrary -> CompileLibrary -> RewriteSource -> CompileSource
//!      -> Combine -> InvokeFinalBuildTool -> Cleanup -> Done
//! ```
//!
//! Any error moves the run to `Aborted`. What varies per target (compile
//! commands, combine parts, the final tool) lives behind [`TargetSteps`].
//!
//! Preflight checks (platform dependencies, tool probes) run before `Init`
//! and never touch the build directory. Intermediates are removed after every
//! run, successful or not, unless the request is in debug mode.

mod apple;
mod native;
mod web;

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::combine::{CombinePlan, combine};
use crate::config::Config;
use crate::error::BuildError;
use crate::library::assemble_library;
use crate::lifecycle::{BuildDir, CleanupScope, LIBRARY_BUNDLE, REWRITTEN_SOURCE};
use crate::request::BuildRequest;
use crate::rewrite::strip_library_import;
use crate::target::Target;
use crate::toolchain::{CommandRunner, Toolchain};
use crate::util::fs::write_atomic;

pub use apple::AppleSteps;
pub use native::NativeSteps;
pub use web::WebSteps;

/// A point in a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  Init,
  AssembleLibrary,
  CompileLibrary,
  RewriteSource,
  CompileSource,
  Combine,
  InvokeFinalBuildTool,
  /// The Xcode build of an Apple project, reported apart from the compile steps.
  ProjectBuild,
  Cleanup,
  Done,
  Aborted,
}

impl Stage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Stage::Init => "init",
      Stage::AssembleLibrary => "assemble-library",
      Stage::CompileLibrary => "compile-library",
      Stage::RewriteSource => "rewrite-source",
      Stage::CompileSource => "compile-source",
      Stage::Combine => "combine",
      Stage::InvokeFinalBuildTool => "invoke-final-build-tool",
      Stage::ProjectBuild => "project-build",
      Stage::Cleanup => "cleanup",
      Stage::Done => "done",
      Stage::Aborted => "aborted",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Everything a target's steps need while running.
pub struct StepContext<'a> {
  pub config: &'a Config,
  pub dir: &'a BuildDir,
  pub toolchain: &'a Toolchain<'a>,
  pub debug: bool,
}

/// The target-specific parts of a pipeline.
pub trait TargetSteps {
  fn target(&self) -> Target;

  /// External programs that must be available before the build starts.
  fn required_tools<'c>(&self, config: &'c Config) -> Vec<&'c str>;

  /// Checks that must pass before anything is written.
  fn preflight(&self, _config: &Config) -> Result<(), BuildError> {
    Ok(())
  }

  /// Turn the assembled library bundle into this target's compiled form.
  fn compile_library(&self, cx: &StepContext<'_>) -> Result<(), BuildError>;

  /// Turn the rewritten application source into this target's compiled form.
  fn compile_source(&self, cx: &StepContext<'_>) -> Result<(), BuildError>;

  /// Work needed before the combined file can be written.
  fn prepare_combine(&self, _cx: &StepContext<'_>) -> Result<(), BuildError> {
    Ok(())
  }

  /// The ordered parts of this target's combined file.
  fn combine_plan(&self, cx: &StepContext<'_>) -> CombinePlan;

  /// Produce the final artifact and return its path.
  fn finish(&self, cx: &StepContext<'_>) -> Result<PathBuf, BuildError>;
}

/// The steps implementation for `target`.
pub fn steps_for(target: Target) -> Box<dyn TargetSteps> {
  match target {
    Target::Native => Box::new(NativeSteps),
    Target::Web => Box::new(WebSteps),
    Target::Ios | Target::Tvos => Box::new(AppleSteps::new(target)),
  }
}

/// A successful pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutput {
  pub target: Target,
  /// The final artifact produced.
  pub artifact: PathBuf,
  /// Intermediates removed after the run.
  pub removed: Vec<PathBuf>,
  /// Intermediates kept because the build ran in debug mode.
  pub retained: Vec<PathBuf>,
}

/// The result of one target's pipeline.
#[derive(Debug)]
pub struct TargetOutcome {
  pub target: Target,
  pub result: Result<BuildOutput, BuildError>,
}

impl TargetOutcome {
  pub fn is_success(&self) -> bool {
    self.result.is_ok()
  }
}

/// Results of every pipeline a `build` invocation ran.
#[derive(Debug, Default)]
pub struct BuildReport {
  pub outcomes: Vec<TargetOutcome>,
}

impl BuildReport {
  pub fn is_success(&self) -> bool {
    self.outcomes.iter().all(TargetOutcome::is_success)
  }

  pub fn successes(&self) -> impl Iterator<Item = &BuildOutput> {
    self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
  }

  pub fn failures(&self) -> impl Iterator<Item = (Target, &BuildError)> {
    self
      .outcomes
      .iter()
      .filter_map(|o| o.result.as_ref().err().map(|e| (o.target, e)))
  }
}

/// Runs target pipelines against one build directory.
pub struct Pipeline<'a> {
  config: &'a Config,
  toolchain: Toolchain<'a>,
  dir: BuildDir,
}

impl<'a> Pipeline<'a> {
  pub fn new(config: &'a Config, runner: &'a dyn CommandRunner) -> Self {
    Self {
      config,
      toolchain: Toolchain::new(runner),
      dir: BuildDir::new(&config.build_dir),
    }
  }

  pub fn build_dir(&self) -> &BuildDir {
    &self.dir
  }

  /// Build every target in `targets`, one after another.
  ///
  /// A failing target does not stop the ones after it.
  pub fn build_all(&self, request: &BuildRequest, targets: &[Target]) -> BuildReport {
    let mut report = BuildReport::default();
    for target in targets {
      let result = self.build(&request.for_target(*target));
      if let Err(e) = &result {
        warn!(target = %target, error = %e, "target failed, continuing with the next one");
      }
      report.outcomes.push(TargetOutcome {
        target: *target,
        result,
      });
    }
    report
  }

  /// Run the pipeline for `request.target()`.
  pub fn build(&self, request: &BuildRequest) -> Result<BuildOutput, BuildError> {
    let steps = steps_for(request.target());
    self.run(steps.as_ref(), request)
  }

  /// Run `steps` for `request`.
  pub fn run(&self, steps: &dyn TargetSteps, request: &BuildRequest) -> Result<BuildOutput, BuildError> {
    let target = steps.target();
    info!(target = %target, source = %request.source().display(), debug = request.debug(), "building");

    steps.preflight(self.config)?;
    for tool in steps.required_tools(self.config) {
      self.toolchain.probe(tool)?;
    }

    let cx = StepContext {
      config: self.config,
      dir: &self.dir,
      toolchain: &self.toolchain,
      debug: request.debug(),
    };

    let mut stage = Stage::Init;
    let result = self.run_stages(steps, request, &cx, &mut stage);

    if let Err(e) = &result {
      warn!(target = %target, stage = %stage, error = %e, "pipeline aborted");
    }

    enter(target, &mut stage, Stage::Cleanup);
    let cleanup = if request.debug() {
      debug!(target = %target, "debug build, keeping intermediates");
      Ok(Vec::new())
    } else {
      self.dir.cleanup(CleanupScope::Intermediate, &[target])
    };

    let artifact = match result {
      Ok(artifact) => artifact,
      Err(e) => {
        if let Err(cleanup_err) = cleanup {
          warn!(target = %target, error = %cleanup_err, "cleanup after failure also failed");
        }
        enter(target, &mut stage, Stage::Aborted);
        return Err(e);
      }
    };
    let removed = cleanup?;
    let retained = if request.debug() {
      self.dir.intermediates(target).into_iter().filter(|p| p.exists()).collect()
    } else {
      Vec::new()
    };

    enter(target, &mut stage, Stage::Done);
    info!(target = %target, artifact = %artifact.display(), "build complete");

    Ok(BuildOutput {
      target,
      artifact,
      removed,
      retained,
    })
  }

  fn run_stages(
    &self,
    steps: &dyn TargetSteps,
    request: &BuildRequest,
    cx: &StepContext<'_>,
    stage: &mut Stage,
  ) -> Result<PathBuf, BuildError> {
    let target = steps.target();
    self.dir.ensure()?;

    enter(target, stage, Stage::AssembleLibrary);
    assemble_library(self.config, &self.dir.path(LIBRARY_BUNDLE))?;

    enter(target, stage, Stage::CompileLibrary);
    steps.compile_library(cx)?;

    enter(target, stage, Stage::RewriteSource);
    let rewritten = strip_library_import(request.source(), &self.config.library_name)?;
    write_atomic(&self.dir.path(REWRITTEN_SOURCE), &rewritten)?;

    enter(target, stage, Stage::CompileSource);
    steps.compile_source(cx)?;

    enter(target, stage, Stage::Combine);
    steps.prepare_combine(cx)?;
    let plan = steps.combine_plan(cx);
    debug!(target = %target, parts = ?plan.labels(), "combine plan");
    combine(&plan)?;

    enter(target, stage, Stage::InvokeFinalBuildTool);
    steps.finish(cx)
  }
}

fn enter(target: Target, current: &mut Stage, next: Stage) {
  debug!(target = %target, from = %current, to = %next, "stage");
  *current = next;
}
