//! `lumen build` against fake toolchains.

use predicates::prelude::*;

use crate::common::{BROKEN_OPAL, GLUE, INDEX_HTML, SUPPORT_JS, TestEnv};

const NATIVE_INTERMEDIATES: &[&str] = &["lumen.rb", "main.rb", "lumen.c", "main.c", "native.c"];
const WEB_INTERMEDIATES: &[&str] = &["lumen.rb", "main.rb", "opal.js", "lumen.js", "interop.js", "main.js"];

#[test]
fn native_build_leaves_only_the_executable() {
  let env = TestEnv::with_toolchain();

  env
    .lumen_cmd()
    .args(["build", "--native", "game.rb"])
    .assert()
    .success()
    .stdout(predicate::str::contains("native:"));

  assert!(env.build_path("game").exists());
  for name in NATIVE_INTERMEDIATES {
    assert!(!env.build_path(name).exists(), "{} left behind", name);
  }
}

#[test]
fn native_debug_build_keeps_intermediates() {
  let env = TestEnv::with_toolchain();

  env
    .lumen_cmd()
    .args(["build", "--native", "game.rb", "--debug"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Intermediates kept"));

  for name in NATIVE_INTERMEDIATES {
    assert!(env.build_path(name).exists(), "{} missing", name);
  }

  let rewritten = env.read_build_file("main.rb");
  assert!(!rewritten.contains("require 'lumen'"));
  assert!(rewritten.contains("Window.open(800, 450, 'demo')"));

  let bundle = env.read_build_file("lumen.rb");
  assert!(bundle.starts_with("# lumen/version\n"));
  assert!(bundle.ends_with("include Lumen\n"));

  let combined = env.read_build_file("native.c");
  assert!(combined.starts_with("#define LUMEN_DESKTOP\n"));
  let library = combined.find("lumen_lib[]").unwrap();
  let source = combined.find("lumen_main[]").unwrap();
  assert!(library < source);
  assert!(combined.ends_with(GLUE));

  assert!(env.read_build_file("game").contains(" -g"));
}

#[test]
fn native_link_flags_come_from_environment() {
  let env = TestEnv::with_toolchain();

  env
    .lumen_cmd()
    .env("LUMEN_LINK_FLAGS", "-lmruby -lraylib -framework Cocoa")
    .args(["build", "--native", "game.rb"])
    .assert()
    .success();

  assert!(env.read_build_file("game").ends_with("-lmruby -lraylib -framework Cocoa\n"));
}

#[test]
fn failed_link_reports_stage_and_cleans_up() {
  let env = TestEnv::with_toolchain();
  env.fake_tool(
    "cc",
    "#!/bin/sh\ncase \"$*\" in *--version*) exit 0 ;; esac\necho 'ld: library not found' >&2\nexit 1\n",
  );

  env
    .lumen_cmd()
    .args(["build", "--native", "game.rb"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("cc failed during invoke-final-build-tool with exit code 1"))
    .stderr(predicate::str::contains("ld: library not found"));

  for name in NATIVE_INTERMEDIATES {
    assert!(!env.build_path(name).exists(), "{} left behind", name);
  }
  assert!(!env.build_path("game").exists());
}

#[test]
fn missing_library_module_is_reported() {
  let env = TestEnv::with_toolchain();
  std::fs::remove_file(env.library_root().join("lib/lumen/sound.rb")).unwrap();

  env
    .lumen_cmd()
    .args(["build", "--native", "game.rb"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("library installation is incomplete"))
    .stderr(predicate::str::contains("sound.rb"));
}

#[test]
fn web_build_produces_bundle_and_page() {
  let env = TestEnv::with_toolchain();

  env
    .lumen_cmd()
    .args(["build", "--web", "game.rb"])
    .assert()
    .success();

  assert_eq!(env.read_build_file("index.html"), INDEX_HTML);

  let bundle = env.read_build_file("game.js");
  assert!(bundle.starts_with(SUPPORT_JS));
  let runtime = bundle.find("--opal-only").unwrap();
  let library = bundle.find("lumen.rb").unwrap();
  let interop = bundle.find("interop.rb").unwrap();
  let source = bundle.find("main.rb").unwrap();
  assert!(runtime < library && library < interop && interop < source);

  for name in WEB_INTERMEDIATES {
    assert!(!env.build_path(name).exists(), "{} left behind", name);
  }
}

#[test]
fn all_continues_after_web_transpile_failure() {
  let env = TestEnv::with_toolchain();
  env.fake_tool("opal", BROKEN_OPAL);

  let assert = env
    .lumen_cmd()
    .args(["build", "--all", "game.rb", "-o", "json"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("opal: unexpected token"));

  let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
  let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
  let targets = report["targets"].as_array().unwrap();

  assert_eq!(report["success"], false);
  assert_eq!(targets.len(), 4);
  assert_eq!(targets[0]["target"], "native");
  assert_eq!(targets[0]["success"], true);
  assert_eq!(targets[1]["target"], "web");
  assert_eq!(targets[1]["error_kind"], "external_tool_failure");
  // No Apple platform libraries are installed in the test library.
  assert_eq!(targets[2]["error_kind"], "platform_dependency_missing");
  assert_eq!(targets[3]["error_kind"], "platform_dependency_missing");

  assert!(env.build_path("game").exists());
  assert!(!env.build_path("game.js").exists());
}

#[test]
fn clean_after_build_empties_build_directory() {
  let env = TestEnv::with_toolchain();
  env
    .lumen_cmd()
    .args(["build", "--web", "game.rb", "--debug"])
    .assert()
    .success();

  env
    .lumen_cmd()
    .args(["build", "--clean"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed"));

  assert!(!env.temp.path().join("build").exists());
}
