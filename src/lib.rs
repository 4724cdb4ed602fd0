pub mod config;
pub mod simulation;
pub mod compute;

pub use simulation::*;
pub use config::*;
