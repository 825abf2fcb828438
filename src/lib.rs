//! Schema Generator - infer structural schemas from semi-structured documents
//!
//! Provides:
//! - Token sources for JSON and XML documents
//! - Schema inference (node identity, value classification, statistics)
//! - Projection of inferred schemas, whole or per variant tag
//! - JSON/YAML output and persistence

pub mod cli;
pub mod export;
pub mod import;
pub mod inference;

// Re-export commonly used types
pub use export::{ExportError, OutputFormat, SchemaDocument, ValueDocument, persist};
pub use import::{InputFormat, JsonValueReader, XmlEventReader};
pub use inference::{
    ContentType, InferenceConfig, InferenceError, InferenceStats, NodeId, NodeKind, Schema,
    SchemaGenerator, SchemaNode, SchemaValue, classify,
};
