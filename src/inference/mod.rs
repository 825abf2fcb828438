//! Schema inference engine for JSON and XML documents
//!
//! This module infers a structural schema, shape plus value statistics,
//! from streamed documents without any a-priori schema.
//!
//! ## Features
//!
//! - **Streaming walks** - JSON and XML parse events drive a nesting stack
//! - **Node identity** - JSON children are scoped to their parent, XML elements
//!   are shared across the whole schema by qualified name
//! - **Value classification** - Empty, boolean, numeric, ISO-8601 date/time and
//!   duration detection on raw text
//! - **Statistics** - Counts plus length, numeric, timestamp and duration ranges
//! - **Variants** - Values can be tagged and projected per tag
//!
//! ## Example
//!
//! ```rust
//! use schema_generator::inference::SchemaGenerator;
//!
//! let mut generator = SchemaGenerator::new();
//! generator.add_json(r#"{"name": "Alice", "age": 30}"#, Some("v1")).unwrap();
//! generator.add_json(r#"{"name": "Bob", "age": "31"}"#, Some("v2")).unwrap();
//!
//! let schema = generator.finish();
//! let document = schema.to_document(None);
//! println!("{}", serde_json::to_string_pretty(&document).unwrap());
//! ```

mod config;
mod error;
mod formats;
mod generator;
mod json_walker;
mod schema;
mod stats;
mod tokens;
mod types;
mod xml_walker;

pub use config::{InferenceConfig, InferenceConfigBuilder};
pub use error::InferenceError;
pub use formats::{Declared, classify, classify_declared};
pub use generator::{InferenceStats, SchemaGenerator};
pub use json_walker::{JsonWalker, WalkSummary, infer_json_schema, walk_json};
pub use schema::{NodeId, Schema, SchemaId, SchemaNode};
pub use stats::{Range, ValueStats};
pub use tokens::{JsonToken, StreamToken, TokenBuffer, TokenSource, XmlToken};
pub use types::{ContentType, NodeKind, SchemaValue};
pub use xml_walker::{XmlWalker, infer_xml_schema, qualified_name, walk_xml};
