pub mod os;
pub mod paths;

use std::path::Path;

use os::Os;

use crate::toolchain::ToolchainCommand;

/// Opens a file with the host's default handler for its type.
///
/// Resolved once from the host OS and handed to the launcher, so the
/// per-OS command choice lives in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformOpener {
  program: String,
  leading_args: Vec<String>,
}

impl PlatformOpener {
  pub fn for_os(os: Os) -> Self {
    match os {
      Os::MacOs => Self {
        program: "open".to_string(),
        leading_args: Vec::new(),
      },
      Os::Linux => Self {
        program: "xdg-open".to_string(),
        leading_args: Vec::new(),
      },
      // `start` is a cmd builtin; its first quoted argument is the window title.
      Os::Windows => Self {
        program: "cmd".to_string(),
        leading_args: vec!["/C".to_string(), "start".to_string(), String::new()],
      },
    }
  }

  /// The opener for the running host, falling back to `xdg-open` on
  /// unrecognised Unix-likes.
  pub fn detect() -> Self {
    Self::for_os(Os::current().unwrap_or(Os::Linux))
  }

  pub fn program(&self) -> &str {
    &self.program
  }

  /// The command that opens `path`.
  pub fn command(&self, path: &Path) -> ToolchainCommand {
    ToolchainCommand::new(&self.program)
      .args(self.leading_args.iter().cloned())
      .arg(path.to_string_lossy())
  }
}
