//! Error types for schema inference

use thiserror::Error;

/// Errors that can occur during schema inference
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// The token source produced an event the walk cannot handle
    #[error("Unexpected token {token} at position {position}")]
    UnexpectedToken { token: String, position: usize },

    /// The token source ended while containers were still open
    #[error("Unexpected end of stream with {open} open container(s)")]
    UnexpectedEndOfStream { open: usize },

    /// Maximum depth exceeded
    #[error("Maximum nesting depth exceeded: {depth} > {max}")]
    MaxDepthExceeded { depth: usize, max: usize },

    /// A node handle belongs to a different schema instance
    #[error("Node belongs to a different schema")]
    OwnershipViolation,

    /// A node handle does not point into this schema's arena
    #[error("Unknown node index {0}")]
    UnknownNode(usize),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),
}

impl From<serde_json::Error> for InferenceError {
    fn from(e: serde_json::Error) -> Self {
        InferenceError::JsonParse(e.to_string())
    }
}

impl From<quick_xml::Error> for InferenceError {
    fn from(e: quick_xml::Error) -> Self {
        InferenceError::XmlParse(e.to_string())
    }
}
