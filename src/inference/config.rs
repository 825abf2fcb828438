//! Configuration for schema inference

use serde::{Deserialize, Serialize};

/// Configuration for schema inference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InferenceConfig {
    /// Name given to the generated schema
    pub schema_name: Option<String>,

    /// Maximum number of documents to ingest (0 = all)
    pub max_documents: usize,

    /// Maximum nesting depth for containers and elements (0 = unlimited)
    pub max_depth: usize,

    /// Re-classify JSON string values so that e.g. "123" is also recorded
    /// as a number
    pub reclassify_strings: bool,

    /// Leave `xmlns` declarations out of the attribute list
    pub skip_namespace_declarations: bool,

    /// Trim XML text content before classifying it
    pub trim_text: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            schema_name: None,
            max_documents: 0, // All documents
            max_depth: 0,     // Unlimited
            reclassify_strings: true,
            skip_namespace_declarations: false,
            trim_text: false,
        }
    }
}

impl InferenceConfig {
    /// Create a builder for custom configuration
    pub fn builder() -> InferenceConfigBuilder {
        InferenceConfigBuilder::default()
    }

    /// Whether `depth` is beyond the configured limit
    pub fn exceeds_depth(&self, depth: usize) -> bool {
        self.max_depth > 0 && depth > self.max_depth
    }
}

/// Builder for InferenceConfig
#[derive(Debug, Default)]
pub struct InferenceConfigBuilder {
    config: InferenceConfig,
}

impl InferenceConfigBuilder {
    /// Set the schema name
    pub fn schema_name(mut self, name: impl Into<String>) -> Self {
        self.config.schema_name = Some(name.into());
        self
    }

    /// Set the maximum number of documents (0 = all)
    pub fn max_documents(mut self, max: usize) -> Self {
        self.config.max_documents = max;
        self
    }

    /// Set the maximum nesting depth (0 = unlimited)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Enable or disable re-classification of JSON strings
    pub fn reclassify_strings(mut self, reclassify: bool) -> Self {
        self.config.reclassify_strings = reclassify;
        self
    }

    /// Enable or disable skipping of namespace declarations
    pub fn skip_namespace_declarations(mut self, skip: bool) -> Self {
        self.config.skip_namespace_declarations = skip;
        self
    }

    /// Enable or disable trimming of XML text
    pub fn trim_text(mut self, trim: bool) -> Self {
        self.config.trim_text = trim;
        self
    }

    /// Build the configuration
    pub fn build(self) -> InferenceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.max_documents, 0);
        assert_eq!(config.max_depth, 0);
        assert!(config.reclassify_strings);
        assert!(!config.skip_namespace_declarations);
    }

    #[test]
    fn test_builder() {
        let config = InferenceConfig::builder()
            .schema_name("feed")
            .max_documents(100)
            .max_depth(5)
            .reclassify_strings(false)
            .trim_text(true)
            .build();

        assert_eq!(config.schema_name.as_deref(), Some("feed"));
        assert_eq!(config.max_documents, 100);
        assert_eq!(config.max_depth, 5);
        assert!(!config.reclassify_strings);
        assert!(config.trim_text);
    }

    #[test]
    fn test_depth_limit() {
        let unlimited = InferenceConfig::default();
        assert!(!unlimited.exceeds_depth(10_000));

        let limited = InferenceConfig::builder().max_depth(3).build();
        assert!(!limited.exceeds_depth(3));
        assert!(limited.exceeds_depth(4));
    }

    #[test]
    fn test_partial_config_from_yaml() {
        let config: InferenceConfig = serde_yaml::from_str("maxDepth: 8\ntrimText: true\n").unwrap();
        assert_eq!(config.max_depth, 8);
        assert!(config.trim_text);
        assert!(config.reclassify_strings);
    }
}
