//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::export::OutputFormat;

/// Infer structural schemas from JSON and XML documents
#[derive(Parser, Debug)]
#[command(name = "schema-generator")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Infer a schema from one or more documents
    Infer(InferArgs),

    /// Show how raw values are classified
    Classify {
        /// Values to classify
        #[arg(required = true)]
        values: Vec<String>,
    },
}

/// Arguments of the `infer` command
#[derive(Args, Debug, Clone)]
pub struct InferArgs {
    /// Input files (`-` for stdin); `TAG=PATH` tags one input with a variant
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Input format
    #[arg(short, long, value_enum, default_value = "auto")]
    pub format: FormatArg,

    /// Variant tag for inputs given without one
    #[arg(long)]
    pub variant: Option<String>,

    /// Schema name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Inference configuration file (JSON or YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the schema here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path template for per-variant schemas, `{}` is replaced by the tag
    #[arg(long)]
    pub typed_output: Option<String>,

    /// Output encoding
    #[arg(long, value_enum, default_value = "json")]
    pub output_format: OutputFormat,
}

/// Input format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Decide from the file extension, then the content
    Auto,
    Json,
    Xml,
}
