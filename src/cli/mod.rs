//! CLI module for the schema-generator binary

#[cfg(feature = "cli")]
pub mod args;
#[cfg(feature = "cli")]
pub mod commands;
#[cfg(feature = "cli")]
pub mod error;
#[cfg(feature = "cli")]
pub mod output;

#[cfg(feature = "cli")]
pub use args::{Cli, Commands, FormatArg, InferArgs};
#[cfg(feature = "cli")]
pub use error::CliError;
