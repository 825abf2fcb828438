//! Schema store: an arena of nodes owned by one schema

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

use super::error::InferenceError;
use super::stats::ValueStats;
use super::types::{ContentType, NodeKind, SchemaValue};

/// Identity of one schema instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaId(Uuid);

impl SchemaId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle to a node inside a [`Schema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    schema: SchemaId,
    index: usize,
}

impl NodeId {
    /// Schema the node belongs to
    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    /// Position in the schema's arena
    pub fn index(&self) -> usize {
        self.index
    }
}

type ChildKey = (NodeKind, Option<String>);

/// One position in the structural tree
#[derive(Debug, Clone)]
pub struct SchemaNode {
    id: NodeId,
    kind: NodeKind,
    name: Option<String>,
    content_types: BTreeSet<ContentType>,
    schema_types: BTreeSet<String>,
    children: Vec<NodeId>,
    child_index: HashMap<ChildKey, NodeId>,
    stats: ValueStats,
}

impl SchemaNode {
    fn new(id: NodeId, kind: NodeKind, name: Option<String>) -> Self {
        let mut content_types = BTreeSet::new();
        if kind == NodeKind::Root {
            content_types.insert(ContentType::Root);
        }

        Self {
            id,
            kind,
            name,
            content_types,
            schema_types: BTreeSet::new(),
            children: Vec::new(),
            child_index: HashMap::new(),
            stats: ValueStats::default(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Owning schema; fixed at creation
    pub fn schema(&self) -> SchemaId {
        self.id.schema
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn content_types(&self) -> &BTreeSet<ContentType> {
        &self.content_types
    }

    /// Variant tags that contributed a value here
    pub fn schema_types(&self) -> &BTreeSet<String> {
        &self.schema_types
    }

    pub fn has_schema_type(&self, tag: &str) -> bool {
        self.schema_types.contains(tag)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn stats(&self) -> &ValueStats {
        &self.stats
    }

    fn link_child(&mut self, key: ChildKey, child: NodeId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
        self.child_index.entry(key).or_insert(child);
    }
}

impl fmt::Display for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} node '{}'", self.kind, name)?,
            None => write!(f, "unnamed {} node", self.kind)?,
        }

        if self.content_types.is_empty() {
            write!(f, " (no content, ")?;
        } else {
            let types: Vec<&str> = self.content_types.iter().map(|t| t.name()).collect();
            write!(f, " (content type(s): {}, ", types.join(", "))?;
        }

        match self.children.len() {
            0 => write!(f, "no children)"),
            1 => write!(f, "1 child)"),
            n => write!(f, "{} children)", n),
        }
    }
}

/// Undo record for the document being walked
#[derive(Debug, Clone)]
struct Checkpoint {
    len: usize,
    /// Prior state of pre-existing nodes, saved on first change
    touched: HashMap<usize, SchemaNode>,
    qualified_names: Vec<String>,
    schema_types: Vec<String>,
}

/// Root of one inference session
///
/// Owns every node in an arena (index 0 is the root), the registry of
/// element names used for XML's schema-wide identity, and the set of variant
/// tags seen so far. The tree only grows, except when a checkpoint is rolled
/// back.
#[derive(Debug, Clone)]
pub struct Schema {
    id: SchemaId,
    name: Option<String>,
    nodes: Vec<SchemaNode>,
    qualified_names: HashMap<String, NodeId>,
    schema_types: BTreeSet<String>,
    checkpoint: Option<Checkpoint>,
}

impl Schema {
    /// Create an empty schema with only a root node
    pub fn new(name: Option<String>) -> Self {
        let id = SchemaId::new();
        let root = NodeId { schema: id, index: 0 };

        Self {
            id,
            name,
            nodes: vec![SchemaNode::new(root, NodeKind::Root, None)],
            qualified_names: HashMap::new(),
            schema_types: BTreeSet::new(),
            checkpoint: None,
        }
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn root(&self) -> NodeId {
        NodeId {
            schema: self.id,
            index: 0,
        }
    }

    /// Every node ever created, root first
    pub fn all_nodes(&self) -> &[SchemaNode] {
        &self.nodes
    }

    /// Number of nodes including the root
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// All variant tags known to the schema
    pub fn schema_types(&self) -> &BTreeSet<String> {
        &self.schema_types
    }

    pub fn node(&self, id: NodeId) -> Result<&SchemaNode, InferenceError> {
        self.check(id)?;
        Ok(&self.nodes[id.index])
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], InferenceError> {
        Ok(self.node(id)?.children())
    }

    /// Look up a child of `parent` by kind and name
    pub fn find_child(&self, parent: NodeId, kind: NodeKind, name: Option<&str>) -> Option<NodeId> {
        self.node(parent)
            .ok()?
            .child_index
            .get(&(kind, name.map(str::to_string)))
            .copied()
    }

    /// Create a new child under `parent`
    pub fn create_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: Option<String>,
    ) -> Result<NodeId, InferenceError> {
        self.check(parent)?;

        let id = NodeId {
            schema: self.id,
            index: self.nodes.len(),
        };
        trace!(parent = parent.index, child = id.index, ?kind, ?name, "creating schema node");

        self.touch(parent.index);
        self.nodes.push(SchemaNode::new(id, kind, name.clone()));
        self.nodes[parent.index].link_child((kind, name), id);
        Ok(id)
    }

    /// Find a child of `parent` by kind and name, creating it if absent
    pub fn resolve_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: Option<&str>,
    ) -> Result<NodeId, InferenceError> {
        self.check(parent)?;
        match self.find_child(parent, kind, name) {
            Some(child) => Ok(child),
            None => self.create_child(parent, kind, name.map(str::to_string)),
        }
    }

    /// Attach an existing node as an additional child reference of `parent`.
    ///
    /// Attaching the same node twice is a no-op.
    pub fn attach_existing_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), InferenceError> {
        self.check(parent)?;
        self.check(node)?;

        let key = {
            let child = &self.nodes[node.index];
            (child.kind, child.name.clone())
        };
        self.touch(parent.index);
        self.nodes[parent.index].link_child(key, node);
        Ok(())
    }

    /// Schema-wide lookup of an element by qualified name
    pub fn lookup_qualified(&self, name: &str) -> Option<NodeId> {
        self.qualified_names.get(name).copied()
    }

    /// Resolve an XML element under `parent` by qualified name.
    ///
    /// A registered element is linked in at the new position. Otherwise the
    /// local child is found or created and registered. Only elements enter
    /// the registry, so JSON fields never take part in XML identity.
    pub fn resolve_element(&mut self, parent: NodeId, name: &str) -> Result<NodeId, InferenceError> {
        if let Some(existing) = self.lookup_qualified(name) {
            self.attach_existing_child(parent, existing)?;
            return Ok(existing);
        }

        let node = self.resolve_child(parent, NodeKind::Child, Some(name))?;
        self.qualified_names.insert(name.to_string(), node);
        if let Some(checkpoint) = &mut self.checkpoint {
            checkpoint.qualified_names.push(name.to_string());
        }
        Ok(node)
    }

    /// Register a variant tag with the schema; blank tags are ignored
    pub fn register_variant_tag(&mut self, tag: &str) {
        if tag.trim().is_empty() {
            return;
        }
        if self.schema_types.insert(tag.to_string()) {
            if let Some(checkpoint) = &mut self.checkpoint {
                checkpoint.schema_types.push(tag.to_string());
            }
        }
    }

    /// Record one observed value against a node.
    ///
    /// Updates the counters, the content type set and the applicable range;
    /// a non-blank `variant` is added to the node and to the schema.
    pub fn record_value(
        &mut self,
        node: NodeId,
        value: &SchemaValue,
        variant: Option<&str>,
    ) -> Result<(), InferenceError> {
        self.check(node)?;

        let tag = variant.filter(|t| !t.trim().is_empty());
        if let Some(tag) = tag {
            self.register_variant_tag(tag);
        }

        self.touch(node.index);
        let target = &mut self.nodes[node.index];
        if let Some(tag) = tag {
            if !target.schema_types.contains(tag) {
                target.schema_types.insert(tag.to_string());
            }
        }
        target.content_types.insert(value.content_type());
        target.stats.observe(value);
        Ok(())
    }

    /// Start recording changes so they can be undone with [`Schema::rollback`].
    ///
    /// Only nodes that already exist and are changed afterwards are copied,
    /// so the cost follows the size of the document, not of the schema.
    pub fn checkpoint(&mut self) {
        self.checkpoint = Some(Checkpoint {
            len: self.nodes.len(),
            touched: HashMap::new(),
            qualified_names: Vec::new(),
            schema_types: Vec::new(),
        });
    }

    /// Keep every change made since the last checkpoint
    pub fn commit(&mut self) {
        self.checkpoint = None;
    }

    /// Undo every change made since the last checkpoint
    pub fn rollback(&mut self) {
        let Some(checkpoint) = self.checkpoint.take() else {
            return;
        };

        self.nodes.truncate(checkpoint.len);
        for (index, node) in checkpoint.touched {
            self.nodes[index] = node;
        }
        for name in checkpoint.qualified_names {
            self.qualified_names.remove(&name);
        }
        for tag in checkpoint.schema_types {
            self.schema_types.remove(&tag);
        }
        trace!(nodes = self.nodes.len(), "rolled back schema changes");
    }

    fn touch(&mut self, index: usize) {
        if let Some(checkpoint) = &mut self.checkpoint {
            if index < checkpoint.len {
                checkpoint
                    .touched
                    .entry(index)
                    .or_insert_with(|| self.nodes[index].clone());
            }
        }
    }

    fn check(&self, id: NodeId) -> Result<(), InferenceError> {
        if id.schema != self.id {
            return Err(InferenceError::OwnershipViolation);
        }
        if id.index >= self.nodes.len() {
            return Err(InferenceError::UnknownNode(id.index));
        }
        Ok(())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Schema '{}'", name),
            None => write!(f, "unnamed Schema"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_new_schema_has_root() {
        let schema = Schema::new(Some("orders".to_string()));
        let root = schema.node(schema.root()).unwrap();

        assert_eq!(root.kind(), NodeKind::Root);
        assert!(root.content_types().contains(&ContentType::Root));
        assert!(schema.is_empty());
        assert_eq!(schema.to_string(), "Schema 'orders'");
    }

    #[test]
    fn test_resolve_child_reuses_by_name() {
        let mut schema = Schema::default();
        let root = schema.root();

        let a = schema.resolve_child(root, NodeKind::Child, Some("a")).unwrap();
        let again = schema.resolve_child(root, NodeKind::Child, Some("a")).unwrap();
        let attr = schema.resolve_child(root, NodeKind::Attribute, Some("a")).unwrap();
        let anon = schema.resolve_child(root, NodeKind::Child, None).unwrap();

        assert_eq!(a, again);
        assert_ne!(a, attr);
        assert_ne!(a, anon);
        assert_eq!(schema.children(root).unwrap().len(), 3);
    }

    #[test]
    fn test_names_are_scoped_to_parent() {
        let mut schema = Schema::default();
        let root = schema.root();
        let left = schema.create_child(root, NodeKind::Child, Some("left".into())).unwrap();
        let right = schema.create_child(root, NodeKind::Child, Some("right".into())).unwrap();

        let left_id = schema.resolve_child(left, NodeKind::Child, Some("id")).unwrap();
        let right_id = schema.resolve_child(right, NodeKind::Child, Some("id")).unwrap();

        assert_ne!(left_id, right_id);
        // Plain children stay out of the element registry
        assert_eq!(schema.lookup_qualified("id"), None);
    }

    #[test]
    fn test_elements_resolve_globally() {
        let mut schema = Schema::default();
        let root = schema.root();
        let left = schema.resolve_element(root, "left").unwrap();
        let right = schema.resolve_element(root, "right").unwrap();

        let item = schema.resolve_element(left, "item").unwrap();
        let again = schema.resolve_element(right, "item").unwrap();

        assert_eq!(item, again);
        assert_eq!(schema.lookup_qualified("item"), Some(item));
        assert_eq!(schema.children(right).unwrap(), &[item]);
        assert_eq!(schema.len(), 4);
    }

    #[test]
    fn test_elements_ignore_plain_children() {
        let mut schema = Schema::default();
        let root = schema.root();
        let doc = schema.create_child(root, NodeKind::Child, None).unwrap();
        let field = schema.create_child(doc, NodeKind::Child, Some("id".into())).unwrap();

        let element = schema.resolve_element(root, "id").unwrap();
        assert_ne!(element, field);
        assert_eq!(schema.lookup_qualified("id"), Some(element));
    }

    #[test]
    fn test_rollback_restores_changed_nodes() {
        let mut schema = Schema::default();
        let root = schema.root();
        let a = schema.resolve_element(root, "a").unwrap();
        schema.record_value(a, &SchemaValue::Object, Some("A")).unwrap();

        schema.checkpoint();
        schema.record_value(a, &SchemaValue::Empty, Some("B")).unwrap();
        let b = schema.resolve_element(a, "b").unwrap();
        schema.record_value(b, &SchemaValue::Object, None).unwrap();
        schema.attach_existing_child(b, a).unwrap();
        schema.rollback();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.lookup_qualified("b"), None);
        assert_eq!(schema.lookup_qualified("a"), Some(a));
        assert_eq!(schema.schema_types().len(), 1);
        assert!(schema.schema_types().contains("A"));

        let node = schema.node(a).unwrap();
        assert_eq!(node.stats().total, 1);
        assert_eq!(node.stats().empty, 0);
        assert!(node.children().is_empty());
        assert!(!node.content_types().contains(&ContentType::Empty));
        assert_eq!(schema.find_child(a, NodeKind::Child, Some("b")), None);
    }

    #[test]
    fn test_commit_keeps_changes() {
        let mut schema = Schema::default();
        let root = schema.root();

        schema.checkpoint();
        let a = schema.resolve_element(root, "a").unwrap();
        schema.commit();
        schema.rollback();

        assert_eq!(schema.lookup_qualified("a"), Some(a));
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn test_foreign_nodes_are_rejected() {
        let mut first = Schema::default();
        let mut second = Schema::default();
        let foreign = second
            .create_child(second.root(), NodeKind::Child, Some("x".into()))
            .unwrap();

        let root = first.root();
        assert_eq!(
            first.attach_existing_child(root, foreign),
            Err(InferenceError::OwnershipViolation)
        );
        assert_eq!(
            first.create_child(foreign, NodeKind::Child, None),
            Err(InferenceError::OwnershipViolation)
        );
    }

    #[test]
    fn test_attach_existing_is_idempotent() {
        let mut schema = Schema::default();
        let root = schema.root();
        let a = schema.create_child(root, NodeKind::Child, Some("a".into())).unwrap();
        let b = schema.create_child(root, NodeKind::Child, Some("b".into())).unwrap();

        schema.attach_existing_child(b, a).unwrap();
        schema.attach_existing_child(b, a).unwrap();

        assert_eq!(schema.children(b).unwrap(), &[a]);
        assert_eq!(schema.find_child(b, NodeKind::Child, Some("a")), Some(a));
    }

    #[test]
    fn test_record_value_tracks_tags() {
        let mut schema = Schema::default();
        let root = schema.root();
        let a = schema.create_child(root, NodeKind::Child, Some("a".into())).unwrap();

        schema.record_value(a, &SchemaValue::Integer(Decimal::from(1)), Some("A")).unwrap();
        schema.record_value(a, &SchemaValue::Empty, Some("  ")).unwrap();
        schema.record_value(a, &SchemaValue::Integer(Decimal::from(4)), None).unwrap();

        let node = schema.node(a).unwrap();
        assert_eq!(node.stats().total, 3);
        assert_eq!(node.stats().empty, 1);
        assert!(node.has_schema_type("A"));
        assert_eq!(node.schema_types().len(), 1);
        assert_eq!(schema.schema_types().len(), 1);
        assert!(node.content_types().contains(&ContentType::Empty));
    }

    #[test]
    fn test_node_display() {
        let mut schema = Schema::default();
        let root = schema.root();
        let a = schema.create_child(root, NodeKind::Child, Some("a".into())).unwrap();
        schema.record_value(a, &SchemaValue::Boolean(true), None).unwrap();

        assert_eq!(
            schema.node(a).unwrap().to_string(),
            "Child node 'a' (content type(s): Boolean, no children)"
        );
        assert_eq!(
            schema.node(root).unwrap().to_string(),
            "unnamed Root node (content type(s): Root, 1 child)"
        );
    }
}
