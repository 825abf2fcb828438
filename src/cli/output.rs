//! Output formatting for CLI

use std::path::PathBuf;

use crate::inference::{InferenceStats, SchemaValue};

/// Format the end-of-run summary printed to stderr
pub fn format_summary(stats: &InferenceStats, written: &[PathBuf]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n✅ Processed {} document(s)\n",
        stats.documents_processed
    ));
    if stats.documents_skipped > 0 {
        output.push_str(&format!(
            "⚠️  Skipped {} document(s) beyond the document limit\n",
            stats.documents_skipped
        ));
    }
    output.push_str(&format!("  Nodes: {}\n", stats.nodes));
    output.push_str(&format!("  Values recorded: {}\n", stats.values_recorded));
    output.push_str(&format!("  Max depth: {}\n", stats.max_depth));
    if stats.variants > 0 {
        output.push_str(&format!("  Variants: {}\n", stats.variants));
    }

    if !written.is_empty() {
        output.push_str("\nWrote:\n");
        for path in written {
            output.push_str(&format!("  - {}\n", path.display()));
        }
    }

    output
}

/// Format one classified value as `value -> ContentType (detail)`
pub fn format_classification(raw: &str, value: &SchemaValue) -> String {
    let detail = match value {
        SchemaValue::Integer(n) | SchemaValue::Decimal(n) => Some(n.to_string()),
        SchemaValue::DateTime(Some(instant)) => Some(instant.to_rfc3339()),
        SchemaValue::TimeSpan(span) => Some(crate::export::format_duration(*span)),
        SchemaValue::Boolean(b) => Some(b.to_string()),
        _ => None,
    };

    match detail {
        Some(detail) => format!("{raw:?} -> {} ({detail})", value.content_type()),
        None => format!("{raw:?} -> {}", value.content_type()),
    }
}
