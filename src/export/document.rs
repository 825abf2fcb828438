//! Projection of a schema into its output document shape

use std::collections::HashSet;

use chrono::{SecondsFormat, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::inference::{ContentType, NodeId, NodeKind, Range, Schema, SchemaNode, ValueStats};

/// One node of a projected schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Variant tags; only present on untyped projections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_types: Option<Vec<String>>,
    pub content_types: Vec<ContentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueDocument>,
    #[serde(default)]
    pub children: Vec<SchemaDocument>,
}

/// Value statistics block of a projected node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Range<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Serialized as decimal strings to stay exact
    pub numeric: Option<Range<Decimal>>,
    /// RFC 3339 timestamps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<Range<String>>,
    /// ISO-8601 durations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_span: Option<Range<String>>,
}

impl ValueDocument {
    fn from_stats(stats: &ValueStats) -> Option<Self> {
        if !stats.is_defined() {
            return None;
        }

        Some(Self {
            total_count: (stats.total > 0).then_some(stats.total),
            empty_count: (stats.empty > 0).then_some(stats.empty),
            length: stats.length,
            numeric: stats.numeric,
            date_time: stats.date_time.map(|r| Range {
                min: r.min.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                max: r.max.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            }),
            time_span: stats.time_span.map(|r| Range {
                min: format_duration(r.min),
                max: format_duration(r.max),
            }),
        })
    }
}

impl SchemaDocument {
    /// Find a direct child by name
    pub fn child(&self, name: &str) -> Option<&SchemaDocument> {
        self.children.iter().find(|c| c.name.as_deref() == Some(name))
    }

    /// Find the anonymous direct child (array element or text slot)
    pub fn anonymous_child(&self) -> Option<&SchemaDocument> {
        self.children
            .iter()
            .find(|c| c.name.is_none() && c.kind == NodeKind::Child)
    }

    /// Number of nodes in this document, itself included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SchemaDocument::node_count).sum::<usize>()
    }
}

impl Schema {
    /// Project the schema, optionally restricted to one variant tag.
    ///
    /// With a tag only children that received a value under that tag are
    /// kept, and `schemaTypes` is left out everywhere. A node is expanded at
    /// its first position in depth-first order; shared XML elements reached
    /// again (including below themselves) are emitted without children, so
    /// the document never has more entries than the schema has links.
    pub fn to_document(&self, variant: Option<&str>) -> SchemaDocument {
        let root = self.root();
        let mut expanded = HashSet::new();
        let mut document = self.project(root, variant, &mut expanded);

        document.name = self.name().map(str::to_string);
        if variant.is_none() {
            document.schema_types = Some(self.schema_types().iter().cloned().collect());
        }
        document
    }

    fn project(&self, id: NodeId, variant: Option<&str>, expanded: &mut HashSet<NodeId>) -> SchemaDocument {
        // Ids handed out by this schema always resolve
        let Ok(node) = self.node(id) else {
            return SchemaDocument::empty(NodeKind::Child);
        };

        let mut document = SchemaDocument::shallow(node, variant.is_none());
        expanded.insert(id);

        for &child_id in node.children() {
            let Ok(child) = self.node(child_id) else {
                continue;
            };
            if let Some(tag) = variant {
                if !child.has_schema_type(tag) {
                    continue;
                }
            }

            if expanded.contains(&child_id) {
                document
                    .children
                    .push(SchemaDocument::shallow(child, variant.is_none()));
            } else {
                document.children.push(self.project(child_id, variant, expanded));
            }
        }

        document
    }
}

impl SchemaDocument {
    fn empty(kind: NodeKind) -> Self {
        Self {
            name: None,
            kind,
            schema_types: None,
            content_types: Vec::new(),
            value: None,
            children: Vec::new(),
        }
    }

    fn shallow(node: &SchemaNode, untyped: bool) -> Self {
        Self {
            name: node.name().map(str::to_string),
            kind: node.kind(),
            schema_types: untyped.then(|| node.schema_types().iter().cloned().collect()),
            content_types: node.content_types().iter().copied().collect(),
            value: ValueDocument::from_stats(node.stats()),
            children: Vec::new(),
        }
    }
}

/// Format a span as an ISO-8601 duration, e.g. `P1DT2H30M` or `-PT0.5S`
pub fn format_duration(span: TimeDelta) -> String {
    if span.is_zero() {
        return "PT0S".to_string();
    }

    let sign = if span < TimeDelta::zero() { "-" } else { "" };
    let span = span.abs();

    let days = span.num_days();
    let hours = span.num_hours() % 24;
    let minutes = span.num_minutes() % 60;
    let seconds = span.num_seconds() % 60;
    let nanos = span.subsec_nanos();

    let mut out = format!("{sign}P");
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 || seconds > 0 || nanos > 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if nanos > 0 {
            let fraction = format!("{nanos:09}");
            out.push_str(&format!("{seconds}.{}S", fraction.trim_end_matches('0')));
        } else if seconds > 0 {
            out.push_str(&format!("{seconds}S"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::SchemaValue;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(TimeDelta::zero()), "PT0S");
        assert_eq!(format_duration(TimeDelta::days(3)), "P3D");
        assert_eq!(
            format_duration(TimeDelta::hours(26) + TimeDelta::minutes(30)),
            "P1DT2H30M"
        );
        assert_eq!(format_duration(-TimeDelta::milliseconds(500)), "-PT0.5S");
    }

    #[test]
    fn test_value_block_only_when_defined() {
        let mut schema = Schema::default();
        let root = schema.root();
        let a = schema.create_child(root, NodeKind::Child, Some("a".into())).unwrap();
        schema.create_child(root, NodeKind::Child, Some("b".into())).unwrap();

        let instant = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        schema.record_value(a, &SchemaValue::DateTime(Some(instant)), None).unwrap();
        schema
            .record_value(a, &SchemaValue::TimeSpan(TimeDelta::hours(1)), None)
            .unwrap();

        let document = schema.to_document(None);
        let a_doc = document.child("a").unwrap();
        let value = a_doc.value.as_ref().unwrap();
        assert_eq!(value.total_count, Some(2));
        assert_eq!(value.empty_count, None);
        assert_eq!(value.date_time.as_ref().unwrap().min, "2020-01-01T00:00:00Z");
        assert_eq!(value.time_span.as_ref().unwrap().max, "PT1H");

        assert!(document.child("b").unwrap().value.is_none());
    }

    #[test]
    fn test_root_carries_name_and_tags() {
        let mut schema = Schema::new(Some("feed".into()));
        let root = schema.root();
        let a = schema.create_child(root, NodeKind::Child, Some("a".into())).unwrap();
        schema.record_value(a, &SchemaValue::Boolean(true), Some("B")).unwrap();
        schema.record_value(a, &SchemaValue::Boolean(false), Some("A")).unwrap();

        let untyped = schema.to_document(None);
        assert_eq!(untyped.name.as_deref(), Some("feed"));
        assert_eq!(untyped.kind, NodeKind::Root);
        assert_eq!(untyped.content_types, vec![ContentType::Root]);
        assert_eq!(untyped.schema_types, Some(vec!["A".to_string(), "B".to_string()]));

        let typed = schema.to_document(Some("A"));
        assert_eq!(typed.schema_types, None);
        assert_eq!(typed.child("a").unwrap().schema_types, None);
    }

    #[test]
    fn test_cycles_are_cut() {
        let mut schema = Schema::default();
        let root = schema.root();
        let a = schema.create_child(root, NodeKind::Child, Some("a".into())).unwrap();
        let b = schema.create_child(a, NodeKind::Child, Some("b".into())).unwrap();
        schema.attach_existing_child(b, a).unwrap();

        let document = schema.to_document(None);
        let a_doc = document.child("a").unwrap();
        let inner_a = a_doc.child("b").unwrap().child("a").unwrap();
        assert!(inner_a.children.is_empty());
        assert_eq!(document.node_count(), 4);
    }

    #[test]
    fn test_shared_nodes_expand_once() {
        // Each level's two elements share the same two children
        let mut schema = Schema::default();
        let root = schema.root();
        let mut level = vec![
            schema.resolve_element(root, "a0").unwrap(),
            schema.resolve_element(root, "b0").unwrap(),
        ];
        for depth in 1..20 {
            let a = schema.resolve_element(level[0], &format!("a{depth}")).unwrap();
            let b = schema.resolve_element(level[0], &format!("b{depth}")).unwrap();
            schema.attach_existing_child(level[1], a).unwrap();
            schema.attach_existing_child(level[1], b).unwrap();
            level = vec![a, b];
        }

        let document = schema.to_document(None);
        // root + one expansion per node + one shallow entry per repeated link
        assert!(document.node_count() < 4 * schema.len());

        let b0 = document.child("b0").unwrap();
        let shared = b0.child("a1").unwrap();
        assert!(shared.children.is_empty());
        assert!(!document.child("a0").unwrap().child("a1").unwrap().children.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let mut schema = Schema::default();
        let root = schema.root();
        let a = schema.create_child(root, NodeKind::Attribute, Some("a".into())).unwrap();
        schema.record_value(a, &SchemaValue::Empty, None).unwrap();

        let json = serde_json::to_value(schema.to_document(None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "Root",
                "schemaTypes": [],
                "contentTypes": ["Root"],
                "children": [{
                    "name": "a",
                    "type": "Attribute",
                    "schemaTypes": [],
                    "contentTypes": ["Empty"],
                    "value": {"totalCount": 1, "emptyCount": 1},
                    "children": []
                }]
            })
        );
    }
}
