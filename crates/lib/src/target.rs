//! Build targets.

use std::fmt;

use serde::Serialize;

/// A platform an application can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
  Native,
  Web,
  Ios,
  Tvos,
}

impl Target {
  /// Every target, in the order `build --all` runs them.
  pub const ALL: [Target; 4] = [Target::Native, Target::Web, Target::Ios, Target::Tvos];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Native => "native",
      Self::Web => "web",
      Self::Ios => "ios",
      Self::Tvos => "tvos",
    }
  }

  /// Whether this target is built through an Xcode project and run on a simulator.
  pub fn is_apple(&self) -> bool {
    matches!(self, Self::Ios | Self::Tvos)
  }

  /// The simulator SDK name passed to `xcodebuild` for Apple targets.
  pub fn simulator_sdk(&self) -> Option<&'static str> {
    match self {
      Self::Ios => Some("iphonesimulator"),
      Self::Tvos => Some("appletvsimulator"),
      _ => None,
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// What a single `build` invocation asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildSelection {
  One(Target),
  All,
}

impl BuildSelection {
  pub fn targets(&self) -> Vec<Target> {
    match self {
      Self::One(target) => vec![*target],
      Self::All => Target::ALL.to_vec(),
    }
  }
}
