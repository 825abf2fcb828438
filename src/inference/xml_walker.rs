//! Streaming walk over XML parse events
//!
//! Elements are identified by qualified name across the whole schema: the
//! first node created for a name is reused wherever that name appears again,
//! and linked in as a child of each new parent. Attributes and text slots
//! stay local to their element.

use tracing::debug;

use super::config::InferenceConfig;
use super::error::InferenceError;
use super::formats::classify;
use super::json_walker::WalkSummary;
use super::schema::{NodeId, Schema};
use super::tokens::{TokenSource, XmlToken};
use super::types::{NodeKind, SchemaValue};

/// Qualified element name, `[namespace]:local` when a namespace is bound
pub fn qualified_name(namespace: Option<&str>, local_name: &str) -> String {
    match namespace.filter(|ns| !ns.is_empty()) {
        Some(ns) => format!("[{ns}]:{local_name}"),
        None => local_name.to_string(),
    }
}

fn is_namespace_declaration(name: &str) -> bool {
    name == "xmlns" || name.starts_with("xmlns:")
}

/// Walks one XML token stream into a schema
pub struct XmlWalker<'a> {
    schema: &'a mut Schema,
    config: &'a InferenceConfig,
    variant: Option<&'a str>,
    stack: Vec<NodeId>,
    summary: WalkSummary,
}

impl<'a> XmlWalker<'a> {
    pub fn new(schema: &'a mut Schema, config: &'a InferenceConfig, variant: Option<&'a str>) -> Self {
        let root = schema.root();
        Self {
            schema,
            config,
            variant,
            stack: vec![root],
            summary: WalkSummary::default(),
        }
    }

    pub fn walk<S>(mut self, mut source: S) -> Result<WalkSummary, InferenceError>
    where
        S: TokenSource<Token = XmlToken>,
    {
        let nodes_before = self.schema.len();
        debug!(variant = ?self.variant, "starting XML walk");

        loop {
            let token = source.next_token()?;
            self.summary.tokens += 1;

            match token {
                XmlToken::ElementStart {
                    namespace,
                    local_name,
                    is_empty,
                    attributes,
                } => {
                    let name = qualified_name(namespace.as_deref(), &local_name);
                    self.element(&name, is_empty, &attributes)?;
                }
                XmlToken::ElementEnd => {
                    if self.stack.len() == 1 {
                        return Err(self.unexpected(&token));
                    }
                    self.stack.pop();
                }
                XmlToken::Text(ref text) | XmlToken::CData(ref text) => self.text(text)?,
                XmlToken::Whitespace => {}
                XmlToken::EndOfStream => break,
                XmlToken::Unsupported(_) => return Err(self.unexpected(&token)),
            }
        }

        if self.stack.len() > 1 {
            return Err(InferenceError::UnexpectedEndOfStream {
                open: self.stack.len() - 1,
            });
        }

        self.summary.nodes_created = self.schema.len() - nodes_before;
        debug!(
            tokens = self.summary.tokens,
            values = self.summary.values_recorded,
            nodes = self.summary.nodes_created,
            "finished XML walk"
        );
        Ok(self.summary)
    }

    fn element(
        &mut self,
        name: &str,
        is_empty: bool,
        attributes: &[(String, String)],
    ) -> Result<(), InferenceError> {
        let depth = self.stack.len();
        if self.config.exceeds_depth(depth) {
            return Err(InferenceError::MaxDepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }
        self.summary.max_depth = self.summary.max_depth.max(depth);

        let parent = self.top();
        let node = self.schema.resolve_element(parent, name)?;
        self.record(node, &SchemaValue::Object)?;

        if !is_empty {
            self.stack.push(node);
        }

        for (attr_name, attr_value) in attributes {
            if self.config.skip_namespace_declarations && is_namespace_declaration(attr_name) {
                continue;
            }
            let attr = self
                .schema
                .resolve_child(node, NodeKind::Attribute, Some(attr_name))?;
            self.record(attr, &classify(attr_value))?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<(), InferenceError> {
        let text = if self.config.trim_text { text.trim() } else { text };
        let parent = self.top();
        let slot = self.schema.resolve_child(parent, NodeKind::Child, None)?;
        self.record(slot, &classify(text))
    }

    fn record(&mut self, node: NodeId, value: &SchemaValue) -> Result<(), InferenceError> {
        self.schema.record_value(node, value, self.variant)?;
        self.summary.values_recorded += 1;
        Ok(())
    }

    fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.schema.root())
    }

    fn unexpected(&self, token: &XmlToken) -> InferenceError {
        InferenceError::UnexpectedToken {
            token: token.to_string(),
            position: self.summary.tokens,
        }
    }
}

/// Walk an XML token stream into `schema`
pub fn walk_xml<S>(
    schema: &mut Schema,
    source: S,
    variant: Option<&str>,
    config: &InferenceConfig,
) -> Result<WalkSummary, InferenceError>
where
    S: TokenSource<Token = XmlToken>,
{
    XmlWalker::new(schema, config, variant).walk(source)
}

/// Infer a fresh schema from a single XML token stream
pub fn infer_xml_schema<S>(source: S) -> Result<Schema, InferenceError>
where
    S: TokenSource<Token = XmlToken>,
{
    let mut schema = Schema::default();
    walk_xml(&mut schema, source, None, &InferenceConfig::default())?;
    Ok(schema)
}
