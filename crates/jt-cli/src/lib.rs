//! jt CLI library.
//!
//! This crate provides the CLI interface for jt.

mod cli;
pub mod commands;
mod config;
pub mod report;

pub use cli::{Cli, Commands};
pub use config::{AuthConfig, Config};
