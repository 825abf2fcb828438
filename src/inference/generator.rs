//! Schema generation session
//!
//! [`SchemaGenerator`] owns one [`Schema`] and folds documents into it. Each
//! document is walked under a schema checkpoint that is committed when the
//! walk succeeds and rolled back otherwise, so a failed document leaves no
//! trace.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::config::InferenceConfig;
use super::error::InferenceError;
use super::json_walker::{WalkSummary, walk_json};
use super::schema::Schema;
use super::tokens::{JsonToken, TokenSource, XmlToken};
use super::xml_walker::walk_xml;
use crate::import::{JsonValueReader, XmlEventReader, json_documents};

/// Statistics from schema generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceStats {
    /// Documents folded into the schema
    pub documents_processed: usize,
    /// Documents ignored because `max_documents` was reached
    pub documents_skipped: usize,
    /// Parse events consumed by successful walks
    pub tokens_read: usize,
    /// Values recorded against nodes
    pub values_recorded: usize,
    /// Nodes in the schema, root excluded
    pub nodes: usize,
    /// Deepest nesting seen
    pub max_depth: usize,
    /// Distinct variant tags
    pub variants: usize,
}

/// Schema generation session
pub struct SchemaGenerator {
    config: InferenceConfig,
    schema: Schema,
    stats: InferenceStats,
}

impl SchemaGenerator {
    /// Create a new generator with default configuration
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    /// Create a new generator with custom configuration
    pub fn with_config(config: InferenceConfig) -> Self {
        let schema = Schema::new(config.schema_name.clone());
        Self {
            config,
            schema,
            stats: InferenceStats::default(),
        }
    }

    /// Continue an existing schema
    pub fn from_schema(schema: Schema, config: InferenceConfig) -> Self {
        let mut generator = Self {
            config,
            schema,
            stats: InferenceStats::default(),
        };
        generator.refresh_shape_stats();
        generator
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.schema.set_name(Some(name.into()));
    }

    /// Add a single JSON document
    pub fn add_json(&mut self, json: &str, variant: Option<&str>) -> Result<(), InferenceError> {
        if self.skip_if_limit_reached() {
            return Ok(());
        }
        let reader = JsonValueReader::from_str(json)?;
        self.add_json_tokens(reader, variant)
    }

    /// Add a parsed JSON value
    pub fn add_json_value(&mut self, value: &Value, variant: Option<&str>) -> Result<(), InferenceError> {
        if self.skip_if_limit_reached() {
            return Ok(());
        }
        self.add_json_tokens(JsonValueReader::from_value(value), variant)
    }

    /// Add every document of a concatenated or newline-delimited JSON text.
    ///
    /// The text is fully parsed first, so malformed input adds nothing.
    /// Returns the number of documents found.
    pub fn add_json_stream(&mut self, text: &str, variant: Option<&str>) -> Result<usize, InferenceError> {
        let documents = json_documents(text)?;
        for document in &documents {
            self.add_json_value(document, variant)?;
        }
        Ok(documents.len())
    }

    /// Add a batch of JSON documents
    pub fn add_json_batch(&mut self, records: &[String], variant: Option<&str>) -> Result<(), InferenceError> {
        for json in records {
            self.add_json(json, variant)?;
        }
        Ok(())
    }

    /// Add a single XML document
    pub fn add_xml(&mut self, xml: &str, variant: Option<&str>) -> Result<(), InferenceError> {
        self.add_xml_tokens(XmlEventReader::from_str(xml), variant)
    }

    /// Add a single XML document from a reader
    pub fn add_xml_reader<R: BufRead>(&mut self, reader: R, variant: Option<&str>) -> Result<(), InferenceError> {
        self.add_xml_tokens(XmlEventReader::from_reader(reader), variant)
    }

    /// Add one document from any JSON token source
    pub fn add_json_tokens<S>(&mut self, source: S, variant: Option<&str>) -> Result<(), InferenceError>
    where
        S: TokenSource<Token = JsonToken>,
    {
        self.ingest(variant, |schema, variant, config| {
            walk_json(schema, source, variant, config)
        })
    }

    /// Add one document from any XML token source
    pub fn add_xml_tokens<S>(&mut self, source: S, variant: Option<&str>) -> Result<(), InferenceError>
    where
        S: TokenSource<Token = XmlToken>,
    {
        self.ingest(variant, |schema, variant, config| {
            walk_xml(schema, source, variant, config)
        })
    }

    fn ingest<F>(&mut self, variant: Option<&str>, walk: F) -> Result<(), InferenceError>
    where
        F: FnOnce(&mut Schema, Option<&str>, &InferenceConfig) -> Result<WalkSummary, InferenceError>,
    {
        if self.skip_if_limit_reached() {
            return Ok(());
        }

        let variant = match variant {
            Some(tag) if tag.trim().is_empty() => {
                warn!("Ignoring blank variant tag");
                None
            }
            other => other,
        };

        self.schema.checkpoint();
        let summary = match walk(&mut self.schema, variant, &self.config) {
            Ok(summary) => {
                self.schema.commit();
                summary
            }
            Err(e) => {
                self.schema.rollback();
                debug!(document = self.stats.documents_processed + 1, error = %e, "Document rejected");
                return Err(e);
            }
        };

        self.stats.documents_processed += 1;
        self.stats.tokens_read += summary.tokens;
        self.stats.values_recorded += summary.values_recorded;
        self.stats.max_depth = self.stats.max_depth.max(summary.max_depth);
        self.refresh_shape_stats();

        debug!(
            document = self.stats.documents_processed,
            variant = ?variant,
            nodes_created = summary.nodes_created,
            "Document added to {}",
            self.schema
        );
        Ok(())
    }

    fn skip_if_limit_reached(&mut self) -> bool {
        let max = self.config.max_documents;
        if max > 0 && self.stats.documents_processed >= max {
            self.stats.documents_skipped += 1;
            debug!(max, "Document limit reached, skipping");
            return true;
        }
        false
    }

    fn refresh_shape_stats(&mut self) {
        self.stats.nodes = self.schema.len() - 1;
        self.stats.variants = self.schema.schema_types().len();
    }

    /// Get current generation statistics
    pub fn stats(&self) -> InferenceStats {
        self.stats.clone()
    }

    /// Get the number of documents processed
    pub fn document_count(&self) -> usize {
        self.stats.documents_processed
    }

    /// Hand over the finished schema
    pub fn finish(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::stats::Range;
    use crate::inference::tokens::TokenBuffer;
    use crate::inference::types::{ContentType, NodeKind};
    use rust_decimal::Decimal;

    fn field(schema: &Schema, name: &str) -> crate::inference::NodeId {
        let doc = schema.find_child(schema.root(), NodeKind::Child, None).unwrap();
        schema.find_child(doc, NodeKind::Child, Some(name)).unwrap()
    }

    #[test]
    fn test_json_fields_merge_across_documents() {
        let mut generator = SchemaGenerator::new();
        generator.add_json(r#"{"a": 1, "b": "x"}"#, None).unwrap();
        generator.add_json(r#"{"a": 2, "b": true}"#, None).unwrap();

        let schema = generator.schema();
        let a = schema.node(field(schema, "a")).unwrap();
        let b = schema.node(field(schema, "b")).unwrap();

        assert_eq!(
            a.content_types().iter().copied().collect::<Vec<_>>(),
            vec![ContentType::NumericInteger]
        );
        assert_eq!(a.stats().numeric, Some(Range { min: Decimal::from(1), max: Decimal::from(2) }));
        assert_eq!(
            b.content_types().iter().copied().collect::<Vec<_>>(),
            vec![ContentType::String, ContentType::Boolean]
        );
    }

    #[test]
    fn test_repeated_document_doubles_totals() {
        let doc = r#"{"id": 1, "tags": ["x", "y"], "owner": {"id": "u1"}}"#;
        let mut generator = SchemaGenerator::new();
        generator.add_json(doc, None).unwrap();
        let nodes_after_first = generator.schema().len();
        let totals_after_first: Vec<u64> = generator
            .schema()
            .all_nodes()
            .iter()
            .map(|n| n.stats().total)
            .collect();

        generator.add_json(doc, None).unwrap();
        let schema = generator.schema();

        assert_eq!(schema.len(), nodes_after_first);
        for (node, first) in schema.all_nodes().iter().zip(totals_after_first) {
            assert_eq!(node.stats().total, first * 2);
            assert!(node.stats().empty <= node.stats().total);
        }
    }

    #[test]
    fn test_failed_document_leaves_schema_untouched() {
        let mut generator = SchemaGenerator::new();
        generator.add_json(r#"{"a": 1}"#, Some("A")).unwrap();
        let before = generator.schema().len();

        let result = generator.add_xml("<r><a>1</a><!DOCTYPE x></r>", Some("B"));
        assert!(result.is_err());

        let schema = generator.schema();
        assert_eq!(schema.len(), before);
        assert!(!schema.schema_types().contains("B"));
        assert_eq!(generator.document_count(), 1);
    }

    #[test]
    fn test_failed_document_restores_shared_nodes() {
        let mut generator = SchemaGenerator::new();
        generator.add_json(r#"{"a": 1}"#, Some("A")).unwrap();

        let result = generator.add_json_tokens(
            TokenBuffer::new([
                JsonToken::ObjectStart,
                JsonToken::PropertyName("a".into()),
                JsonToken::Integer(5),
                JsonToken::PropertyName("b".into()),
                JsonToken::String("x".into()),
                JsonToken::Unsupported("Comment".into()),
            ]),
            Some("B"),
        );
        assert!(matches!(result, Err(InferenceError::UnexpectedToken { .. })));

        let schema = generator.schema();
        let top = schema.find_child(schema.root(), NodeKind::Child, None).unwrap();
        assert_eq!(schema.children(top).unwrap().len(), 1);
        assert_eq!(schema.node(top).unwrap().stats().total, 1);

        let a = schema.node(field(schema, "a")).unwrap();
        assert_eq!(a.stats().total, 1);
        assert_eq!(a.stats().numeric, Some(Range { min: Decimal::from(1), max: Decimal::from(1) }));
        assert!(!a.has_schema_type("B"));
        assert!(!schema.schema_types().contains("B"));

        generator.add_json(r#"{"a": 2}"#, None).unwrap();
        assert_eq!(generator.schema().len(), 3);
    }

    #[test]
    fn test_max_documents() {
        let config = InferenceConfig::builder().max_documents(1).build();
        let mut generator = SchemaGenerator::with_config(config);
        generator.add_json(r#"{"a": 1}"#, None).unwrap();
        generator.add_json(r#"{"b": 1}"#, None).unwrap();
        generator.add_json("not json", None).unwrap();

        let stats = generator.stats();
        assert_eq!(stats.documents_processed, 1);
        assert_eq!(stats.documents_skipped, 2);
        assert_eq!(stats.nodes, 2);
    }

    #[test]
    fn test_json_stream() {
        let mut generator = SchemaGenerator::new();
        let count = generator
            .add_json_stream("{\"a\": 1}\n{\"a\": 5}\n", Some("feed"))
            .unwrap();
        assert_eq!(count, 2);

        let schema = generator.schema();
        let a = schema.node(field(schema, "a")).unwrap();
        assert_eq!(a.stats().numeric, Some(Range { min: Decimal::from(1), max: Decimal::from(5) }));
        assert_eq!(generator.stats().variants, 1);
    }

    #[test]
    fn test_blank_variant_is_ignored() {
        let mut generator = SchemaGenerator::new();
        generator.add_xml("<a>1</a>", Some(" ")).unwrap();
        assert!(generator.schema().schema_types().is_empty());
    }

    #[test]
    fn test_schema_name_from_config() {
        let config = InferenceConfig::builder().schema_name("orders").build();
        let mut generator = SchemaGenerator::with_config(config);
        generator.add_xml_reader("<order id=\"1\"/>".as_bytes(), None).unwrap();

        let stats = generator.stats();
        assert_eq!(stats.documents_processed, 1);
        assert_eq!(stats.max_depth, 1);

        let schema = generator.finish();
        assert_eq!(schema.name(), Some("orders"));
        assert!(schema.lookup_qualified("order").is_some());
    }
}
