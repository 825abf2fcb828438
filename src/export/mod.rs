//! Export functionality
//!
//! Projects an inferred schema into its output document shape and writes it
//! out:
//! - JSON (pretty printed)
//! - YAML

pub mod document;
pub mod persist;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Template error: {0}")]
    TemplateError(String),
}

/// Encoding of written documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(ExportError::SerializationError(format!(
                "unknown output format '{other}'"
            ))),
        }
    }
}

// Re-export for convenience
pub use document::{SchemaDocument, ValueDocument, format_duration};
pub use persist::{TAG_PLACEHOLDER, persist, persist_variants, render, typed_path};
