use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::combine::{CombinePlan, Part};
use crate::config::Config;
use crate::error::BuildError;
use crate::lifecycle::{
  INTEROP_JS, LIBRARY_BUNDLE, LIBRARY_JS, REWRITTEN_SOURCE, SOURCE_JS, TRANSPILER_RUNTIME, WEB_BUNDLE, WEB_ENTRY,
};
use crate::target::Target;
use crate::toolchain::ToolchainCommand;
use crate::util::fs::write_atomic;

use super::{Stage, StepContext, TargetSteps};

/// Browser bundle: everything transpiled to JavaScript and concatenated,
/// next to a copy of the library's HTML page.
pub struct WebSteps;

impl TargetSteps for WebSteps {
  fn target(&self) -> Target {
    Target::Web
  }

  fn required_tools<'c>(&self, config: &'c Config) -> Vec<&'c str> {
    vec![config.tools.transpiler.as_str()]
  }

  /// The transpiler runtime, the library bundle and the interop shim.
  fn compile_library(&self, cx: &StepContext<'_>) -> Result<(), BuildError> {
    let runtime = ToolchainCommand::new(&cx.config.tools.transpiler)
      .args(["--compile", "--opal-only"])
      .stdout_to(cx.dir.path(TRANSPILER_RUNTIME));
    cx.toolchain.run(&runtime, Stage::CompileLibrary)?;

    transpile(cx, &cx.dir.path(LIBRARY_BUNDLE), LIBRARY_JS, Stage::CompileLibrary)?;

    let interop = cx.config.web_interop();
    if !interop.is_file() {
      return Err(BuildError::ResourceMissing { path: interop });
    }
    transpile(cx, &interop, INTEROP_JS, Stage::CompileLibrary)
  }

  fn compile_source(&self, cx: &StepContext<'_>) -> Result<(), BuildError> {
    transpile(cx, &cx.dir.path(REWRITTEN_SOURCE), SOURCE_JS, Stage::CompileSource)
  }

  fn combine_plan(&self, cx: &StepContext<'_>) -> CombinePlan {
    CombinePlan::new(cx.dir.path(WEB_BUNDLE))
      .part(Part::file("support script", cx.config.web_support()))
      .part(Part::file("transpiler runtime", cx.dir.path(TRANSPILER_RUNTIME)))
      .part(Part::file("compiled library", cx.dir.path(LIBRARY_JS)))
      .part(Part::file("compiled interop shim", cx.dir.path(INTEROP_JS)))
      .part(Part::file("compiled source", cx.dir.path(SOURCE_JS)))
  }

  /// Copy the HTML entry point next to the bundle, unmodified.
  fn finish(&self, cx: &StepContext<'_>) -> Result<PathBuf, BuildError> {
    let template = cx.config.web_template();
    let html = fs::read(&template).map_err(|e| match e.kind() {
      io::ErrorKind::NotFound => BuildError::ResourceMissing { path: template.clone() },
      _ => BuildError::io(&template, e),
    })?;

    let entry = cx.dir.path(WEB_ENTRY);
    write_atomic(&entry, &html)?;
    Ok(entry)
  }
}

/// `opal --compile --no-opal <input>`, JavaScript captured from stdout.
fn transpile(cx: &StepContext<'_>, input: &Path, output: &str, stage: Stage) -> Result<(), BuildError> {
  let cmd = ToolchainCommand::new(&cx.config.tools.transpiler)
    .args(["--compile", "--no-opal"])
    .path_arg(input)
    .stdout_to(cx.dir.path(output));
  cx.toolchain.run(&cmd, stage)
}
