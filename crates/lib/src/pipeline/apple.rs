use std::path::PathBuf;

use tracing::debug;

use crate::combine::CombinePlan;
use crate::config::Config;
use crate::consts::{APPLE_FRAMEWORK_LIBS, XCODE_PROJECT};
use crate::error::BuildError;
use crate::lifecycle::{APPLE_COMBINED, APPLE_PRODUCTS, LIBRARY_BUNDLE, LIBRARY_C, REWRITTEN_SOURCE, SOURCE_C};
use crate::target::Target;
use crate::toolchain::ToolchainCommand;
use crate::util::fs::copy_dir;

use super::native::{LIBRARY_SYMBOL, SOURCE_SYMBOL, bytecode_plan, compile_bytecode};
use super::{Stage, StepContext, TargetSteps};

const MOBILE_FLAG: &str = "#define LUMEN_MOBILE";
const IOS_FLAG: &str = "#define LUMEN_IOS";
const TVOS_FLAG: &str = "#define LUMEN_TVOS";

/// iOS or tvOS simulator app: compiled like native, then built by Xcode from
/// a copy of the library's project template.
pub struct AppleSteps {
  target: Target,
}

impl AppleSteps {
  pub fn new(target: Target) -> Self {
    debug_assert!(target.is_apple());
    Self { target }
  }

  fn os_flag(&self) -> &'static str {
    match self.target {
      Target::Tvos => TVOS_FLAG,
      _ => IOS_FLAG,
    }
  }
}

impl TargetSteps for AppleSteps {
  fn target(&self) -> Target {
    self.target
  }

  fn required_tools<'c>(&self, config: &'c Config) -> Vec<&'c str> {
    vec![config.tools.bytecode_compiler.as_str(), config.tools.project_builder.as_str()]
  }

  /// The project template and prebuilt static libraries must be installed.
  fn preflight(&self, config: &Config) -> Result<(), BuildError> {
    let template = config.project_template(self.target);
    let mut required = vec![template.join(format!("{}.xcodeproj", XCODE_PROJECT))];
    let vendor = config.vendor_dir(self.target);
    required.extend(APPLE_FRAMEWORK_LIBS.iter().map(|lib| vendor.join(lib)));

    for path in required {
      if !path.exists() {
        return Err(BuildError::PlatformDependencyMissing {
          target: self.target,
          path,
        });
      }
    }
    Ok(())
  }

  fn compile_library(&self, cx: &StepContext<'_>) -> Result<(), BuildError> {
    compile_bytecode(cx, LIBRARY_BUNDLE, LIBRARY_SYMBOL, LIBRARY_C, Stage::CompileLibrary)
  }

  fn compile_source(&self, cx: &StepContext<'_>) -> Result<(), BuildError> {
    compile_bytecode(cx, REWRITTEN_SOURCE, SOURCE_SYMBOL, SOURCE_C, Stage::CompileSource)
  }

  /// A fresh copy of the project template receives the combined file.
  fn prepare_combine(&self, cx: &StepContext<'_>) -> Result<(), BuildError> {
    let project = cx.dir.project_dir(self.target);
    copy_dir(&cx.config.project_template(self.target), &project)?;
    debug!(target = %self.target, path = %project.display(), "copied project template");
    Ok(())
  }

  fn combine_plan(&self, cx: &StepContext<'_>) -> CombinePlan {
    let dest = cx.dir.project_dir(self.target).join(APPLE_COMBINED);
    bytecode_plan(cx, dest, &[MOBILE_FLAG, self.os_flag()])
  }

  fn finish(&self, cx: &StepContext<'_>) -> Result<PathBuf, BuildError> {
    let project = cx.dir.project_dir(self.target);
    let project_abs = dunce::canonicalize(&project).map_err(|e| BuildError::io(&project, e))?;
    let sdk = self.target.simulator_sdk().unwrap_or("iphonesimulator");

    let cmd = ToolchainCommand::new(&cx.config.tools.project_builder)
      .arg("-project")
      .arg(format!("{}.xcodeproj", XCODE_PROJECT))
      .args(["-scheme", XCODE_PROJECT, "-sdk", sdk, "-configuration", "Debug"])
      .arg(format!("SYMROOT={}", project_abs.join(APPLE_PRODUCTS).display()))
      .arg("build")
      .current_dir(&project_abs);

    cx.toolchain.run(&cmd, Stage::ProjectBuild)?;
    Ok(project)
  }
}
