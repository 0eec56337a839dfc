use std::path::{Path, PathBuf};

use crate::combine::{CombinePlan, Part};
use crate::config::Config;
use crate::error::BuildError;
use crate::lifecycle::{EXECUTABLE, LIBRARY_BUNDLE, LIBRARY_C, NATIVE_COMBINED, REWRITTEN_SOURCE, SOURCE_C};
use crate::target::Target;
use crate::toolchain::ToolchainCommand;

use super::{Stage, StepContext, TargetSteps};

/// C symbol the compiled library bytecode is exported as.
pub(super) const LIBRARY_SYMBOL: &str = "lumen_lib";
/// C symbol the compiled application bytecode is exported as.
pub(super) const SOURCE_SYMBOL: &str = "lumen_main";

pub(super) const DESKTOP_FLAG: &str = "#define LUMEN_DESKTOP";

/// Desktop executable: bytecode compiled to C, linked with the native runtime.
pub struct NativeSteps;

impl TargetSteps for NativeSteps {
  fn target(&self) -> Target {
    Target::Native
  }

  fn required_tools<'c>(&self, config: &'c Config) -> Vec<&'c str> {
    vec![config.tools.bytecode_compiler.as_str(), config.tools.c_compiler.as_str()]
  }

  fn compile_library(&self, cx: &StepContext<'_>) -> Result<(), BuildError> {
    compile_bytecode(cx, LIBRARY_BUNDLE, LIBRARY_SYMBOL, LIBRARY_C, Stage::CompileLibrary)
  }

  fn compile_source(&self, cx: &StepContext<'_>) -> Result<(), BuildError> {
    compile_bytecode(cx, REWRITTEN_SOURCE, SOURCE_SYMBOL, SOURCE_C, Stage::CompileSource)
  }

  fn combine_plan(&self, cx: &StepContext<'_>) -> CombinePlan {
    bytecode_plan(cx, cx.dir.path(NATIVE_COMBINED), &[DESKTOP_FLAG])
  }

  fn finish(&self, cx: &StepContext<'_>) -> Result<PathBuf, BuildError> {
    let executable = cx.dir.path(EXECUTABLE);
    let mut cmd = ToolchainCommand::new(&cx.config.tools.c_compiler)
      .path_arg(&cx.dir.path(NATIVE_COMBINED))
      .arg("-o")
      .path_arg(&executable)
      .produces(&executable);
    if cx.debug {
      cmd = cmd.arg("-g");
    }
    cmd = cmd.args(cx.config.link_flags.iter().cloned());

    cx.toolchain.run(&cmd, Stage::InvokeFinalBuildTool)?;
    Ok(executable)
  }
}

/// `mrbc [-g] -B<symbol> -o <output> <input>`, all paths in the build directory.
pub(super) fn compile_bytecode(
  cx: &StepContext<'_>,
  input: &str,
  symbol: &str,
  output: &str,
  stage: Stage,
) -> Result<(), BuildError> {
  let output = cx.dir.path(output);
  let mut cmd = ToolchainCommand::new(&cx.config.tools.bytecode_compiler);
  if cx.debug {
    cmd = cmd.arg("-g");
  }
  let cmd = cmd
    .arg(format!("-B{}", symbol))
    .arg("-o")
    .path_arg(&output)
    .path_arg(&cx.dir.path(input))
    .produces(&output);

  cx.toolchain.run(&cmd, stage)
}

/// Flags, compiled library, compiled source, then the runtime glue that
/// defines `main()` and refers to both bytecode symbols.
pub(super) fn bytecode_plan(cx: &StepContext<'_>, dest: impl AsRef<Path>, flags: &[&str]) -> CombinePlan {
  let library = flags
    .iter()
    .fold(Part::file("compiled library", cx.dir.path(LIBRARY_C)), |part, flag| {
      part.with_marker(*flag)
    });

  CombinePlan::new(dest.as_ref())
    .part(library)
    .part(Part::file("compiled source", cx.dir.path(SOURCE_C)))
    .part(Part::file("runtime glue", cx.config.native_glue()))
}
