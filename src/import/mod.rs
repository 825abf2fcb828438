//! Import functionality
//!
//! Token sources that turn raw documents into parse events for the walk
//! engines:
//! - JSON (via `serde_json`)
//! - XML (via `quick-xml`'s namespace-aware reader)

pub mod json;
pub mod xml;

use std::path::Path;

use serde::{Deserialize, Serialize};

// Re-export for convenience
pub use json::{JsonValueReader, json_documents};
pub use xml::XmlEventReader;

/// Document format of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Json,
    Xml,
}

impl InputFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" | "jsonl" | "ndjson" | "geojson" => Some(InputFormat::Json),
            "xml" | "xsd" | "rss" | "atom" | "svg" | "xhtml" => Some(InputFormat::Xml),
            _ => None,
        }
    }

    /// Guess the format from the first non-whitespace character
    pub fn sniff(content: &str) -> Option<Self> {
        match content.trim_start().chars().next()? {
            '<' => Some(InputFormat::Xml),
            '{' | '[' | '"' => Some(InputFormat::Json),
            _ => None,
        }
    }
}
