//! Test utilities for lumen-lib.
//!
//! Cross-platform shell helpers and a throwaway library installation that
//! pipeline tests can build against.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::Config;
use crate::consts::{APPLE_FRAMEWORK_LIBS, XCODE_PROJECT};
use crate::target::Target;

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// A temporary workspace holding a complete library installation, an
/// application source file and a (not yet created) build directory.
pub struct Workspace {
  pub temp: TempDir,
  pub config: Config,
  pub source: PathBuf,
}

impl Workspace {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("library");

    let config = Config::new(&root).with_build_dir(temp.path().join("build"));

    for module in &config.modules {
      write(&config.module_path(module), &format!("# {}\nmodule Lumen; end\n", module));
    }
    write(&config.native_glue(), "int main(void) { return lumen_run(lumen_main); }\n");
    write(&config.web_support(), "window.Lumen = {};\n");
    write(&config.web_interop(), "module Lumen::Interop; end\n");
    write(&config.web_template(), "<html><script src=\"game.js\"></script></html>\n");

    for target in [Target::Ios, Target::Tvos] {
      let project = config.project_template(target).join(format!("{}.xcodeproj", XCODE_PROJECT));
      write(&project.join("project.pbxproj"), "// !$*UTF8*$!\n");
      for lib in APPLE_FRAMEWORK_LIBS {
        write(&config.vendor_dir(target).join(lib), "!<arch>\n");
      }
    }

    let source = temp.path().join("game.rb");
    write(&source, "require 'lumen'\n\nWindow.open(800, 450, 'demo')\n");

    Self { temp, config, source }
  }

  pub fn build_dir(&self) -> &Path {
    &self.config.build_dir
  }
}

fn write(path: &Path, contents: &str) {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, contents).unwrap();
}
