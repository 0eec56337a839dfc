//! Shared test helpers for CLI integration tests.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

use lumen_lib::consts::LIBRARY_MODULES;

/// Writes a `-B<symbol>` array to the `-o` path.
pub const FAKE_MRBC: &str = r#"#!/bin/sh
out=""
sym=""
prev=""
for arg in "$@"; do
  case "$prev" in -o) out="$arg" ;; esac
  case "$arg" in -B*) sym="${arg#-B}" ;; esac
  prev="$arg"
done
if [ -n "$out" ]; then
  printf 'const uint8_t %s[] = {0};\n' "$sym" > "$out"
fi
exit 0
"#;

/// Writes its own arguments to the `-o` path.
pub const FAKE_CC: &str = r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
  case "$prev" in -o) out="$arg" ;; esac
  prev="$arg"
done
if [ -n "$out" ]; then
  printf 'linked: %s\n' "$*" > "$out"
fi
exit 0
"#;

/// Prints a comment naming what it was asked to compile.
pub const FAKE_OPAL: &str = r#"#!/bin/sh
printf '// opal %s\n' "$*"
exit 0
"#;

/// Available, but every transpile fails.
pub const BROKEN_OPAL: &str = r#"#!/bin/sh
case "$*" in
  *--no-opal*) echo "opal: unexpected token" >&2; exit 1 ;;
esac
printf '// opal runtime\n'
exit 0
"#;

pub const GAME_SOURCE: &str = "require 'lumen'\n\nWindow.open(800, 450, 'demo')\n";
pub const GLUE: &str = "int main(void) { return lumen_run(lumen_lib, lumen_main); }\n";
pub const SUPPORT_JS: &str = "window.Lumen = {};\n";
pub const INDEX_HTML: &str = "<html><body><script src=\"game.js\"></script></body></html>\n";

/// Isolated test environment.
///
/// Holds a library installation, a game source file and a `bin` directory
/// that is the only thing on `PATH` for commands it creates.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// A library installation for the native and web targets, with no tools installed.
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    for module in LIBRARY_MODULES {
      env.write_file(&format!("library/lib/{}.rb", module), &format!("# {}\n", module));
    }
    env.write_file("library/native/lumen_main.c", GLUE);
    env.write_file("library/web/support.js", SUPPORT_JS);
    env.write_file("library/web/interop.rb", "module Lumen::Interop; end\n");
    env.write_file("library/web/index.html", INDEX_HTML);
    env.write_file("game.rb", GAME_SOURCE);
    fs::create_dir_all(env.bin_dir()).unwrap();
    env
  }

  /// Same as [`TestEnv::new`] with working `mrbc`, `cc` and `opal` fakes.
  pub fn with_toolchain() -> Self {
    let env = Self::new();
    env.fake_tool("mrbc", FAKE_MRBC);
    env.fake_tool("cc", FAKE_CC);
    env.fake_tool("opal", FAKE_OPAL);
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
  }

  /// Install an executable script as `name` on the test `PATH`.
  pub fn fake_tool(&self, name: &str, script: &str) {
    let path = self.bin_dir().join(name);
    fs::write(&path, script).unwrap();
    make_executable(&path);
  }

  pub fn bin_dir(&self) -> PathBuf {
    self.temp.path().join("bin")
  }

  pub fn library_root(&self) -> PathBuf {
    self.temp.path().join("library")
  }

  pub fn build_path(&self, name: &str) -> PathBuf {
    self.temp.path().join("build").join(name)
  }

  pub fn read_build_file(&self, name: &str) -> String {
    fs::read_to_string(self.build_path(name)).unwrap_or_else(|e| panic!("Failed to read build/{}: {}", name, e))
  }

  /// Get a pre-configured Command for the lumen binary.
  ///
  /// The environment is cleared, then:
  /// - `PATH`: only the fake tool directory
  /// - `LUMEN_LIBRARY_ROOT`: the test library installation
  /// - working directory: the temp directory, so `build/` lands there
  pub fn lumen_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("lumen");
    cmd.env_clear();
    cmd.env("PATH", self.bin_dir());
    cmd.env("LUMEN_LIBRARY_ROOT", self.library_root());
    cmd.current_dir(self.temp.path());
    cmd
  }
}

pub fn make_executable(path: &Path) {
  let mut perms = fs::metadata(path).unwrap().permissions();
  perms.set_mode(0o755);
  fs::set_permissions(path, perms).unwrap();
}
