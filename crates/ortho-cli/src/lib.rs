//! OrthoEvidence CLI library.
//!
//! This library provides the core functionality for the `ortho` command-line
//! interface: configuration management, command execution, and output
//! formatting. The engine itself lives in the ortho-classifier,
//! ortho-aggregator, and ortho-scorer crates; the CLI is the thin
//! operational shell around them.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod seed;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
