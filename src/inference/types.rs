//! Node kinds, content types and observed values

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position kind of a node in the structural tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKind {
    /// The schema root
    Root,
    /// An object field, array element, XML element or anonymous text slot
    Child,
    /// An XML attribute
    Attribute,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Root => write!(f, "Root"),
            NodeKind::Child => write!(f, "Child"),
            NodeKind::Attribute => write!(f, "Attribute"),
        }
    }
}

/// Semantic classification of an observed value
///
/// The declaration order is the order used when content type sets are
/// serialized.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ContentType {
    /// Free text, also the fallback classification
    #[default]
    String,
    NumericInteger,
    NumericDecimal,
    Boolean,
    DateTime,
    TimeSpan,
    Object,
    Array,
    /// Null, empty or whitespace-only text
    Empty,
    Root,
}

impl ContentType {
    /// Name used in serialized output
    pub fn name(&self) -> &'static str {
        match self {
            ContentType::String => "String",
            ContentType::NumericInteger => "NumericInteger",
            ContentType::NumericDecimal => "NumericDecimal",
            ContentType::Boolean => "Boolean",
            ContentType::DateTime => "DateTime",
            ContentType::TimeSpan => "TimeSpan",
            ContentType::Object => "Object",
            ContentType::Array => "Array",
            ContentType::Empty => "Empty",
            ContentType::Root => "Root",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One observed terminal value
///
/// Values are consumed immediately by a node's statistics update and never
/// stored.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaValue {
    Root,
    /// An object or XML element occurrence
    Object,
    /// A closed array with its element count
    Array(usize),
    Empty,
    String(String),
    Integer(Decimal),
    Decimal(Decimal),
    Boolean(bool),
    /// An ISO-8601 date/time; the instant is known only for forms that pin
    /// down a calendar day
    DateTime(Option<DateTime<Utc>>),
    TimeSpan(TimeDelta),
}

impl SchemaValue {
    /// The content type this value is recorded as
    pub fn content_type(&self) -> ContentType {
        match self {
            SchemaValue::Root => ContentType::Root,
            SchemaValue::Object => ContentType::Object,
            SchemaValue::Array(_) => ContentType::Array,
            SchemaValue::Empty => ContentType::Empty,
            SchemaValue::String(_) => ContentType::String,
            SchemaValue::Integer(_) => ContentType::NumericInteger,
            SchemaValue::Decimal(_) => ContentType::NumericDecimal,
            SchemaValue::Boolean(_) => ContentType::Boolean,
            SchemaValue::DateTime(_) => ContentType::DateTime,
            SchemaValue::TimeSpan(_) => ContentType::TimeSpan,
        }
    }

    /// Build a numeric value, choosing integer or decimal by fractional part
    pub fn numeric(value: Decimal) -> Self {
        if value.fract().is_zero() {
            SchemaValue::Integer(value)
        } else {
            SchemaValue::Decimal(value)
        }
    }
}
