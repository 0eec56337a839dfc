//! lumen-lib: Build orchestration for Lumen games
//!
//! This crate turns a single Ruby source file that uses the Lumen library
//! into a runnable artifact for one or more targets:
//! - `library`: concatenates the library modules into one bundle
//! - `rewrite`: strips the library import from the application source
//! - `toolchain`: runs the external compilers behind a swappable runner
//! - `combine`: joins compiled pieces into a single file
//! - `pipeline`: the per-target stage sequence (native, web, iOS, tvOS)
//! - `lifecycle`: what lives in the build directory and how it is cleaned
//! - `launch`: starts a built artifact
//! - `simulator`: passthrough commands for the Apple simulator

pub mod combine;
pub mod config;
pub mod consts;
pub mod error;
pub mod launch;
pub mod library;
pub mod lifecycle;
pub mod pipeline;
pub mod platform;
pub mod request;
pub mod rewrite;
pub mod simulator;
pub mod target;
pub mod toolchain;
pub mod util;
