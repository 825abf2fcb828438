//! Writing projected schemas to files

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{ExportError, OutputFormat, SchemaDocument};
use crate::inference::Schema;

/// Placeholder replaced by the variant tag in typed output paths
pub const TAG_PLACEHOLDER: &str = "{}";

/// Encode a projected document
pub fn render(document: &SchemaDocument, format: OutputFormat) -> Result<String, ExportError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(document)
            .map_err(|e| ExportError::SerializationError(e.to_string())),
        OutputFormat::Yaml => serde_yaml::to_string(document)
            .map_err(|e| ExportError::SerializationError(e.to_string())),
    }
}

/// Path of the typed output for `tag`
pub fn typed_path(template: &str, tag: &str) -> Result<PathBuf, ExportError> {
    if !template.contains(TAG_PLACEHOLDER) {
        return Err(ExportError::TemplateError(format!(
            "'{template}' has no {TAG_PLACEHOLDER} placeholder"
        )));
    }
    Ok(PathBuf::from(template.replace(TAG_PLACEHOLDER, &file_safe(tag))))
}

fn file_safe(tag: &str) -> String {
    tag.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn write(path: &Path, content: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ExportError::IoError(format!("{}: {}", parent.display(), e)))?;
    }
    fs::write(path, content).map_err(|e| ExportError::IoError(format!("{}: {}", path.display(), e)))
}

/// Write the untyped projection to `main_file` and, given a template, one
/// filtered projection per known variant tag.
///
/// Returns the paths written, main file first.
pub fn persist(
    schema: &Schema,
    main_file: &Path,
    typed_template: Option<&str>,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    // Validate before touching the filesystem
    let typed = match typed_template {
        Some(template) => variant_paths(schema, template)?,
        None => Vec::new(),
    };

    write(main_file, &render(&schema.to_document(None), format)?)?;
    let mut written = vec![main_file.to_path_buf()];
    written.extend(write_variants(schema, typed, format)?);

    info!(files = written.len(), "Persisted {}", schema);
    Ok(written)
}

/// Write one filtered projection per known variant tag
pub fn persist_variants(
    schema: &Schema,
    typed_template: &str,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    let typed = variant_paths(schema, typed_template)?;
    let written = write_variants(schema, typed, format)?;
    info!(files = written.len(), "Persisted variants of {}", schema);
    Ok(written)
}

fn variant_paths(schema: &Schema, template: &str) -> Result<Vec<(String, PathBuf)>, ExportError> {
    schema
        .schema_types()
        .iter()
        .map(|tag| Ok((tag.clone(), typed_path(template, tag)?)))
        .collect()
}

fn write_variants(
    schema: &Schema,
    typed: Vec<(String, PathBuf)>,
    format: OutputFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    let mut written = Vec::with_capacity(typed.len());
    for (tag, path) in typed {
        write(&path, &render(&schema.to_document(Some(&tag)), format)?)?;
        written.push(path);
    }
    Ok(written)
}
