//! `lumen launch` and `lumen simulator` against fake programs.

use std::fs;

use predicates::prelude::*;

use crate::common::{TestEnv, make_executable};

/// An `xcrun` that appends each invocation's arguments to `log`.
fn recording_xcrun(env: &TestEnv) -> std::path::PathBuf {
  let log = env.temp.path().join("xcrun.log");
  env.fake_tool(
    "xcrun",
    &format!("#!/bin/sh\nprintf '%s\\n' \"$*\" >> '{}'\nexit 0\n", log.display()),
  );
  log
}

fn fake_game(env: &TestEnv, script: &str) {
  let game = env.build_path("game");
  fs::create_dir_all(game.parent().unwrap()).unwrap();
  fs::write(&game, script).unwrap();
  make_executable(&game);
}

#[test]
fn launch_native_runs_game_from_build_directory() {
  let env = TestEnv::new();
  fake_game(&env, "#!/bin/sh\nprintf 'ran\\n' > launched.txt\n");

  env.lumen_cmd().args(["launch", "--native"]).assert().success();

  assert_eq!(env.read_build_file("launched.txt"), "ran\n");
}

#[test]
fn launch_native_reports_game_exit_code() {
  let env = TestEnv::new();
  fake_game(&env, "#!/bin/sh\nexit 3\n");

  env
    .lumen_cmd()
    .args(["launch", "--native"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("exit code 3"));
}

#[test]
fn launch_ios_opens_installs_then_launches() {
  let env = TestEnv::new();
  let log = recording_xcrun(&env);
  fs::create_dir_all(env.build_path("ios/out/Debug-iphonesimulator/Lumen.app")).unwrap();

  env.lumen_cmd().args(["launch", "--ios"]).assert().success();

  let calls = fs::read_to_string(log).unwrap();
  let calls: Vec<_> = calls.lines().collect();
  assert_eq!(calls.len(), 3);
  assert_eq!(calls[0], "simctl bootstatus iPhone 15 -b");
  assert!(calls[1].starts_with("simctl install iPhone 15 "));
  assert!(calls[1].ends_with("Lumen.app"));
  assert_eq!(calls[2], "simctl launch iPhone 15 com.lumen.game");
}

#[test]
fn launch_tvos_uses_configured_device_and_bundle() {
  let env = TestEnv::new();
  let log = recording_xcrun(&env);
  fs::create_dir_all(env.build_path("tvos/out/Debug-appletvsimulator/Lumen.app")).unwrap();

  env
    .lumen_cmd()
    .env("LUMEN_TVOS_DEVICE", "Apple TV 4K")
    .env("LUMEN_BUNDLE_ID", "org.example.pong")
    .args(["launch", "--tvos"])
    .assert()
    .success();

  let calls = fs::read_to_string(log).unwrap();
  assert!(calls.starts_with("simctl bootstatus Apple TV 4K -b\n"));
  assert!(calls.ends_with("simctl launch Apple TV 4K org.example.pong\n"));
}

#[test]
fn launch_ios_without_build_spawns_nothing() {
  let env = TestEnv::new();
  let log = recording_xcrun(&env);

  env
    .lumen_cmd()
    .args(["launch", "--ios"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("ios has not been built"));

  assert!(!log.exists());
}

#[test]
fn simulator_log_errors_passes_predicate() {
  let env = TestEnv::new();
  let log = recording_xcrun(&env);

  env.lumen_cmd().args(["simulator", "--log-errors"]).assert().success();

  let calls = fs::read_to_string(log).unwrap();
  let calls: Vec<_> = calls.lines().collect();
  assert_eq!(
    calls,
    vec![
      "--version",
      "simctl spawn booted log stream --level debug --predicate messageType == error",
    ]
  );
}

#[test]
fn simulator_install_targets_booted_device() {
  let env = TestEnv::new();
  let log = recording_xcrun(&env);

  env
    .lumen_cmd()
    .args(["simulator", "--install", "Pong.app"])
    .assert()
    .success();

  let calls = fs::read_to_string(log).unwrap();
  assert!(calls.ends_with("simctl install booted Pong.app\n"));
}
