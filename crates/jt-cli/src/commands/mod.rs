//! CLI subcommand implementations.

pub mod dump;
pub mod parse;
pub mod submit;
mod util;
