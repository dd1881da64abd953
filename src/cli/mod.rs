//! Command-line entry point: flag parsing and server bootstrap.

mod cli;

pub use cli::{run, Cli};
