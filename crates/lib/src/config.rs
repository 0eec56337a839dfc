//! Build configuration.
//!
//! A [`Config`] is assembled once per invocation (defaults, then environment
//! overrides, then whatever the CLI passes) and is passed by reference into
//! every pipeline. Nothing in the crate reads process-wide settings after that.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::consts::{
  DEFAULT_BUILD_DIR, DEFAULT_BUNDLE_ID, DEFAULT_IOS_DEVICE, DEFAULT_LINK_FLAGS, DEFAULT_TVOS_DEVICE, LIBRARY_MODULES,
  LIBRARY_NAME,
};
use crate::platform::paths::default_library_root;
use crate::target::Target;

pub const ENV_LIBRARY_ROOT: &str = "LUMEN_LIBRARY_ROOT";
pub const ENV_BUILD_DIR: &str = "LUMEN_BUILD_DIR";
pub const ENV_LINK_FLAGS: &str = "LUMEN_LINK_FLAGS";
pub const ENV_IOS_DEVICE: &str = "LUMEN_IOS_DEVICE";
pub const ENV_TVOS_DEVICE: &str = "LUMEN_TVOS_DEVICE";
pub const ENV_BUNDLE_ID: &str = "LUMEN_BUNDLE_ID";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("cannot locate the Lumen library: set {ENV_LIBRARY_ROOT} or pass --library-root")]
  NoLibraryRoot,

  #[error("{var} must not be empty")]
  EmptyValue { var: &'static str },
}

/// Program names of the external tools the pipelines drive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolset {
  /// Compiles Ruby to bytecode embedded in C source.
  pub bytecode_compiler: String,
  /// Transpiles Ruby to JavaScript on stdout.
  pub transpiler: String,
  pub c_compiler: String,
  pub project_builder: String,
  /// Front end for `simctl`.
  pub simulator: String,
}

impl Default for Toolset {
  fn default() -> Self {
    Self {
      bytecode_compiler: "mrbc".to_string(),
      transpiler: "opal".to_string(),
      c_compiler: "cc".to_string(),
      project_builder: "xcodebuild".to_string(),
      simulator: "xcrun".to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  /// Root of the installed library sources.
  pub library_root: PathBuf,
  /// Directory holding every intermediate and final artifact.
  pub build_dir: PathBuf,
  /// Name application sources import the library by.
  pub library_name: String,
  /// Library modules in dependency order.
  pub modules: Vec<String>,
  pub tools: Toolset,
  /// Extra arguments for the native link step.
  pub link_flags: Vec<String>,
  pub ios_device: String,
  pub tvos_device: String,
  pub bundle_id: String,
}

impl Config {
  /// Configuration with built-in defaults for everything except the library root.
  pub fn new(library_root: impl Into<PathBuf>) -> Self {
    Self {
      library_root: library_root.into(),
      build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
      library_name: LIBRARY_NAME.to_string(),
      modules: LIBRARY_MODULES.iter().map(|m| m.to_string()).collect(),
      tools: Toolset::default(),
      link_flags: DEFAULT_LINK_FLAGS.iter().map(|f| f.to_string()).collect(),
      ios_device: DEFAULT_IOS_DEVICE.to_string(),
      tvos_device: DEFAULT_TVOS_DEVICE.to_string(),
      bundle_id: DEFAULT_BUNDLE_ID.to_string(),
    }
  }

  /// Build a configuration from defaults and `LUMEN_*` environment variables.
  ///
  /// `library_root` takes precedence over the environment when given.
  pub fn from_env(library_root: Option<PathBuf>) -> Result<Self, ConfigError> {
    let root = match library_root {
      Some(root) => root,
      None => match env_value(ENV_LIBRARY_ROOT)? {
        Some(root) => PathBuf::from(root),
        None => default_library_root().ok_or(ConfigError::NoLibraryRoot)?,
      },
    };

    let mut config = Config::new(root);

    if let Some(dir) = env_value(ENV_BUILD_DIR)? {
      config.build_dir = PathBuf::from(dir);
    }
    if let Some(flags) = std::env::var_os(ENV_LINK_FLAGS) {
      config.link_flags = flags.to_string_lossy().split_whitespace().map(String::from).collect();
    }
    if let Some(device) = env_value(ENV_IOS_DEVICE)? {
      config.ios_device = device;
    }
    if let Some(device) = env_value(ENV_TVOS_DEVICE)? {
      config.tvos_device = device;
    }
    if let Some(id) = env_value(ENV_BUNDLE_ID)? {
      config.bundle_id = id;
    }

    debug!(
      library_root = %config.library_root.display(),
      build_dir = %config.build_dir.display(),
      "loaded configuration"
    );
    Ok(config)
  }

  pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
    self.build_dir = build_dir.into();
    self
  }

  pub fn with_tools(mut self, tools: Toolset) -> Self {
    self.tools = tools;
    self
  }

  /// Source file of a library module.
  pub fn module_path(&self, module: &str) -> PathBuf {
    self.library_root.join("lib").join(format!("{}.rb", module))
  }

  /// C source containing `main()` for native and Apple builds.
  pub fn native_glue(&self) -> PathBuf {
    self.library_root.join("native").join("lumen_main.c")
  }

  /// Browser-side support script loaded ahead of the transpiler runtime.
  pub fn web_support(&self) -> PathBuf {
    self.web_dir().join("support.js")
  }

  /// Ruby shim bridging the library to browser APIs.
  pub fn web_interop(&self) -> PathBuf {
    self.web_dir().join("interop.rb")
  }

  pub fn web_template(&self) -> PathBuf {
    self.web_dir().join("index.html")
  }

  /// Xcode project template for an Apple target.
  pub fn project_template(&self, target: Target) -> PathBuf {
    self.library_root.join("platforms").join(target.as_str())
  }

  /// Prebuilt static libraries for an Apple target.
  pub fn vendor_dir(&self, target: Target) -> PathBuf {
    self.library_root.join("vendor").join(target.as_str())
  }

  /// Simulator device an Apple target launches on.
  pub fn simulator_device(&self, target: Target) -> &str {
    match target {
      Target::Tvos => &self.tvos_device,
      _ => &self.ios_device,
    }
  }

  fn web_dir(&self) -> PathBuf {
    self.library_root.join("web")
  }
}

fn env_value(var: &'static str) -> Result<Option<String>, ConfigError> {
  match std::env::var_os(var) {
    Some(value) if value.is_empty() => Err(ConfigError::EmptyValue { var }),
    Some(value) => Ok(Some(value.to_string_lossy().into_owned())),
    None => Ok(None),
  }
}
