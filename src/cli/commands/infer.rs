//! Infer command implementation

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::args::{FormatArg, InferArgs};
use crate::cli::error::CliError;
use crate::cli::output::format_summary;
use crate::export::{persist, persist_variants, render};
use crate::import::InputFormat;
use crate::inference::{InferenceConfig, SchemaGenerator};

/// One input argument, optionally tagged with a variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub tag: Option<String>,
    pub path: String,
}

impl InputSpec {
    /// Parse `PATH` or `TAG=PATH`; untagged inputs take `default_tag`
    pub fn parse(raw: &str, default_tag: Option<&str>) -> Self {
        if let Some((tag, path)) = raw.split_once('=') {
            if !tag.is_empty() && !path.is_empty() && !Path::new(raw).exists() {
                return Self {
                    tag: Some(tag.to_string()),
                    path: path.to_string(),
                };
            }
        }
        Self {
            tag: default_tag.map(str::to_string),
            path: raw.to_string(),
        }
    }
}

/// Load input content from file or stdin
fn load_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Load an inference configuration, YAML by extension, JSON otherwise
pub fn load_config(path: Option<&Path>) -> Result<InferenceConfig, CliError> {
    let Some(path) = path else {
        return Ok(InferenceConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(&content)
            .map_err(|e| CliError::ConfigError(path.to_path_buf(), e.to_string()))
    } else {
        serde_json::from_str(&content)
            .map_err(|e| CliError::ConfigError(path.to_path_buf(), e.to_string()))
    }
}

/// Pick the format of one input
pub fn resolve_format(requested: FormatArg, path: &str, content: &str) -> Result<InputFormat, CliError> {
    match requested {
        FormatArg::Json => Ok(InputFormat::Json),
        FormatArg::Xml => Ok(InputFormat::Xml),
        FormatArg::Auto => InputFormat::from_path(Path::new(path))
            .or_else(|| InputFormat::sniff(content))
            .ok_or_else(|| CliError::UnknownFormat(path.to_string())),
    }
}

/// Handle the infer command
pub fn handle_infer(args: &InferArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = &args.name {
        config.schema_name = Some(name.clone());
    }
    let mut generator = SchemaGenerator::with_config(config);

    for raw in &args.inputs {
        let input = InputSpec::parse(raw, args.variant.as_deref());
        let content = load_input(&input.path)?;
        let format = resolve_format(args.format, &input.path, &content)?;
        let tag = input.tag.as_deref();

        match format {
            InputFormat::Json => {
                let documents = generator
                    .add_json_stream(&content, tag)
                    .with_context(|| format!("Failed to infer schema from {}", input.path))?;
                info!(input = %input.path, documents, "Read JSON input");
            }
            InputFormat::Xml => {
                generator
                    .add_xml(&content, tag)
                    .with_context(|| format!("Failed to infer schema from {}", input.path))?;
                info!(input = %input.path, "Read XML input");
            }
        }
    }

    let stats = generator.stats();
    let schema = generator.finish();

    let written = match &args.output {
        Some(path) => persist(&schema, path, args.typed_output.as_deref(), args.output_format)
            .context("Failed to write schema")?,
        None => {
            println!("{}", render(&schema.to_document(None), args.output_format)?);
            match &args.typed_output {
                Some(template) => persist_variants(&schema, template, args.output_format)
                    .context("Failed to write variant schemas")?,
                None => Vec::new(),
            }
        }
    };

    eprint!("{}", format_summary(&stats, &written));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::OutputFormat;

    #[test]
    fn test_input_spec() {
        assert_eq!(
            InputSpec::parse("v1=data/a.json", None),
            InputSpec {
                tag: Some("v1".into()),
                path: "data/a.json".into()
            }
        );
        assert_eq!(
            InputSpec::parse("data/a.json", Some("all")),
            InputSpec {
                tag: Some("all".into()),
                path: "data/a.json".into()
            }
        );
        assert_eq!(InputSpec::parse("=a.json", None).tag, None);
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(
            resolve_format(FormatArg::Auto, "a.xml", "").unwrap(),
            InputFormat::Xml
        );
        assert_eq!(
            resolve_format(FormatArg::Auto, "-", " {\"a\": 1}").unwrap(),
            InputFormat::Json
        );
        assert_eq!(
            resolve_format(FormatArg::Json, "a.xml", "<a/>").unwrap(),
            InputFormat::Json
        );
        assert!(resolve_format(FormatArg::Auto, "a.txt", "plain").is_err());
    }

    #[test]
    fn test_load_yaml_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "schemaName: feed\nmaxDocuments: 3\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.schema_name.as_deref(), Some("feed"));
        assert_eq!(config.max_documents, 3);
    }

    #[test]
    fn test_handle_infer_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.xml");
        std::fs::write(&a, r#"{"id": 1}"#).unwrap();
        std::fs::write(&b, "<r><id>2</id></r>").unwrap();

        let output = dir.path().join("schema.json");
        let template = dir.path().join("schema-{}.json");
        let args = InferArgs {
            inputs: vec![
                format!("json={}", a.display()),
                format!("xml={}", b.display()),
            ],
            format: FormatArg::Auto,
            variant: None,
            name: Some("mixed".into()),
            config: None,
            output: Some(output.clone()),
            typed_output: Some(template.display().to_string()),
            output_format: OutputFormat::Json,
        };

        handle_infer(&args).unwrap();

        assert!(output.exists());
        assert!(dir.path().join("schema-json.json").exists());
        assert!(dir.path().join("schema-xml.json").exists());
    }
}
