pub mod commands;
pub mod seed;
pub mod operators;
pub mod recover;

pub use commands::{Cli, Commands};
