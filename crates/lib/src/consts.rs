pub const APP_NAME: &str = "lumen";

/// Name the library is imported by in application sources.
pub const LIBRARY_NAME: &str = "lumen";

/// Library modules in dependency order. A module may only reference symbols
/// defined by the modules before it.
pub const LIBRARY_MODULES: &[&str] = &[
  "lumen/version",
  "lumen/color",
  "lumen/vector2",
  "lumen/rectangle",
  "lumen/circle",
  "lumen/line",
  "lumen/window",
  "lumen/keyboard",
  "lumen/mouse",
  "lumen/gamepad",
  "lumen/image",
  "lumen/texture",
  "lumen/sprite",
  "lumen/font",
  "lumen/sound",
  "lumen/music",
  "lumen/camera2d",
  "lumen/timer",
  "lumen/lumen",
];

/// Appended to the library bundle so that a top-level script sees the
/// library's constants without qualification.
pub const LIBRARY_EPILOGUE: &str = "include Lumen";

pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_BUNDLE_ID: &str = "com.lumen.game";
pub const DEFAULT_IOS_DEVICE: &str = "iPhone 15";
pub const DEFAULT_TVOS_DEVICE: &str = "Apple TV";
pub const DEFAULT_LINK_FLAGS: &[&str] = &["-lmruby", "-lraylib", "-lm"];

/// Xcode project and scheme name inside each Apple project template.
pub const XCODE_PROJECT: &str = "Lumen";

/// Static libraries an Apple project template links against.
pub const APPLE_FRAMEWORK_LIBS: &[&str] = &["libmruby.a", "libraylib.a"];
