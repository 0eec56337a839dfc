mod build;
mod launch;
mod simulator;

pub use build::{cmd_build, cmd_clean};
pub use launch::cmd_launch;
pub use simulator::cmd_simulator;
