//! Configuration module for HostCpu
//!
//! Provides CLI arguments, subcommands and the runtime settings derived
//! from them.

mod settings;

pub use settings::*;
