/// Host operating system families lumen knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// The family of the running host, if lumen supports it.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" | "freebsd" | "openbsd" | "netbsd" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }
}
