//! Report rendering module
//!
//! Formats summaries, profiles and edit results for the terminal.

mod render;

pub use render::*;
