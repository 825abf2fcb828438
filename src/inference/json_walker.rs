//! Streaming walk over JSON parse events
//!
//! Children are identified by property name within their immediate parent.
//! Containers record `Object` or `Array(len)` when they close; scalars record
//! their declared subtype and, for strings, the re-classified text.

use tracing::debug;

use super::config::InferenceConfig;
use super::error::InferenceError;
use super::formats::{Declared, classify, classify_declared};
use super::schema::{NodeId, Schema};
use super::tokens::{JsonToken, TokenSource};
use super::types::{ContentType, NodeKind, SchemaValue};

/// Counters describing one completed walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub tokens: usize,
    pub values_recorded: usize,
    pub nodes_created: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Root,
    Object,
    Array,
}

#[derive(Debug)]
struct Frame {
    node: NodeId,
    container: Container,
    elements: usize,
}

/// Walks one JSON token stream into a schema
pub struct JsonWalker<'a> {
    schema: &'a mut Schema,
    config: &'a InferenceConfig,
    variant: Option<&'a str>,
    stack: Vec<Frame>,
    pending_name: Option<String>,
    summary: WalkSummary,
}

impl<'a> JsonWalker<'a> {
    pub fn new(schema: &'a mut Schema, config: &'a InferenceConfig, variant: Option<&'a str>) -> Self {
        let root = schema.root();
        Self {
            schema,
            config,
            variant,
            stack: vec![Frame {
                node: root,
                container: Container::Root,
                elements: 0,
            }],
            pending_name: None,
            summary: WalkSummary::default(),
        }
    }

    /// Consume the source until its end-of-stream token
    pub fn walk<S>(mut self, mut source: S) -> Result<WalkSummary, InferenceError>
    where
        S: TokenSource<Token = JsonToken>,
    {
        let nodes_before = self.schema.len();
        debug!(variant = ?self.variant, "starting JSON walk");

        loop {
            let token = source.next_token()?;
            self.summary.tokens += 1;

            match token {
                JsonToken::ObjectStart => self.open(Container::Object)?,
                JsonToken::ArrayStart => self.open(Container::Array)?,
                JsonToken::ObjectEnd => self.close(Container::Object, &token)?,
                JsonToken::ArrayEnd => self.close(Container::Array, &token)?,
                JsonToken::PropertyName(name) => self.pending_name = Some(name),
                JsonToken::Null => self.scalar(Declared::Null)?,
                JsonToken::Boolean(b) => self.scalar(Declared::Boolean(b))?,
                JsonToken::Integer(i) => self.scalar(Declared::Integer(i))?,
                JsonToken::Float(f) => self.scalar(Declared::Float(f))?,
                JsonToken::Date(d) => self.scalar(Declared::Date(d))?,
                JsonToken::String(ref text) => self.scalar(Declared::Text(text))?,
                JsonToken::EndOfStream => break,
                JsonToken::Unsupported(_) => return Err(self.unexpected(&token)),
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
            "finished JSON walk"
        );
        Ok(self.summary)
    }

    fn open(&mut self, container: Container) -> Result<(), InferenceError> {
        let node = self.resolve_pending()?;
        self.count_element();

        self.stack.push(Frame {
            node,
            container,
            elements: 0,
        });

        let depth = self.stack.len() - 1;
        if self.config.exceeds_depth(depth) {
            return Err(InferenceError::MaxDepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }
        self.summary.max_depth = self.summary.max_depth.max(depth);
        Ok(())
    }

    fn close(&mut self, container: Container, token: &JsonToken) -> Result<(), InferenceError> {
        let matches = self
            .stack
            .last()
            .is_some_and(|frame| frame.container == container);
        if !matches || self.stack.len() == 1 {
            return Err(self.unexpected(token));
        }

        let Some(frame) = self.stack.pop() else {
            return Err(self.unexpected(token));
        };
        let value = match container {
            Container::Array => SchemaValue::Array(frame.elements),
            _ => SchemaValue::Object,
        };
        self.record(frame.node, &value)
    }

    fn scalar(&mut self, declared: Declared<'_>) -> Result<(), InferenceError> {
        let node = self.resolve_pending()?;
        self.count_element();

        let value = classify_declared(declared);
        self.record(node, &value)?;

        if let Declared::Text(text) = declared {
            if self.config.reclassify_strings {
                let semantic = classify(text);
                if semantic.content_type() != ContentType::String {
                    self.record(node, &semantic)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_pending(&mut self) -> Result<NodeId, InferenceError> {
        let parent = self.top();
        let name = self.pending_name.take();
        self.schema
            .resolve_child(parent, NodeKind::Child, name.as_deref().filter(|n| !n.is_empty()))
    }

    fn record(&mut self, node: NodeId, value: &SchemaValue) -> Result<(), InferenceError> {
        self.schema.record_value(node, value, self.variant)?;
        self.summary.values_recorded += 1;
        Ok(())
    }

    fn count_element(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.elements += 1;
        }
    }

    fn top(&self) -> NodeId {
        self.stack
            .last()
            .map_or_else(|| self.schema.root(), |frame| frame.node)
    }

    fn unexpected(&self, token: &JsonToken) -> InferenceError {
        InferenceError::UnexpectedToken {
            token: token.to_string(),
            position: self.summary.tokens,
        }
    }
}

/// Walk a JSON token stream into `schema`
pub fn walk_json<S>(
    schema: &mut Schema,
    source: S,
    variant: Option<&str>,
    config: &InferenceConfig,
) -> Result<WalkSummary, InferenceError>
where
    S: TokenSource<Token = JsonToken>,
{
    JsonWalker::new(schema, config, variant).walk(source)
}

/// Infer a fresh schema from a single JSON token stream
pub fn infer_json_schema<S>(source: S) -> Result<Schema, InferenceError>
where
    S: TokenSource<Token = JsonToken>,
{
    let mut schema = Schema::default();
    walk_json(&mut schema, source, None, &InferenceConfig::default())?;
    Ok(schema)
}
