//! CLI module
//!
//! Command-line interface for running a pagination.
//!
//! # Commands
//!
//! - `fetch` - Request every page and print a status line per page
//! - `validate` - Check a config file

mod commands;
mod runner;

pub use commands::{Cli, Commands, DecoderKind, FetchArgs, OutputFormat};
pub use runner::{resolve_config, status_line, Runner};

#[cfg(test)]
mod tests;
