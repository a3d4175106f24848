//! Schema validation with located error reporting

use jsonschema::{validator_for, ValidationError as JsonSchemaError, Validator as JsonValidator};
use miette::{Diagnostic, NamedSource, SourceSpan};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use thiserror::Error;

use crate::schema::SchemaKind;

/// Validation failure with source location information
#[derive(Debug, Error, Diagnostic)]
#[error("schema validation failed: {summary}")]
#[diagnostic(code(cft::schema::validation))]
pub struct ValidationError {
    summary: String,

    #[source_code]
    src: NamedSource<String>,

    #[related]
    violations: Vec<SchemaViolation>,
}

/// A single schema violation
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct SchemaViolation {
    #[label("{}", self.hint)]
    span: SourceSpan,

    message: String,
    hint: String,
}

impl ValidationError {
    fn new(filename: &str, source: &str, violations: Vec<SchemaViolation>) -> Self {
        let summary = match violations.len() {
            1 => "1 violation".to_string(),
            n => format!("{} violations", n),
        };
        Self {
            summary,
            src: NamedSource::new(filename, source.to_string()),
            violations,
        }
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

/// Validator holding the compiled embedded schemas
pub struct Validator {
    compiled: HashMap<SchemaKind, JsonValidator>,
}

impl Validator {
    pub fn new() -> Self {
        let mut compiled = HashMap::new();

        for kind in SchemaKind::all() {
            if let Some(schema_str) = kind.schema_source() {
                if let Ok(schema_json) = serde_json::from_str::<JsonValue>(&schema_str) {
                    if let Ok(schema) = validator_for(&schema_json) {
                        compiled.insert(*kind, schema);
                    }
                }
            }
        }

        Self { compiled }
    }

    /// Validate YAML content against the schema for the given kind.
    /// Returns all violations at once.
    pub fn validate(
        &self,
        content: &str,
        filename: &str,
        kind: SchemaKind,
    ) -> Result<(), ValidationError> {
        let yaml_value: serde_yml::Value = match serde_yml::from_str(content) {
            Ok(v) => v,
            Err(e) => {
                let violation = SchemaViolation {
                    span: (0, content.len()).into(),
                    message: format!("YAML parse error: {}", e),
                    hint: "invalid YAML".to_string(),
                };
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        let json_value: JsonValue = match serde_json::to_value(&yaml_value) {
            Ok(v) => v,
            Err(e) => {
                let violation = SchemaViolation {
                    span: (0, content.len()).into(),
                    message: format!("failed to convert YAML to JSON: {}", e),
                    hint: "conversion error".to_string(),
                };
                return Err(ValidationError::new(filename, content, vec![violation]));
            }
        };

        // No schema compiled for this kind: validation passes
        let Some(schema) = self.compiled.get(&kind) else {
            return Ok(());
        };

        let violations: Vec<SchemaViolation> = schema
            .iter_errors(&json_value)
            .map(|e| to_violation(content, &e))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(filename, content, violations))
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn to_violation(content: &str, error: &JsonSchemaError) -> SchemaViolation {
    let path = error.instance_path.to_string();
    let location = if path.is_empty() {
        "document root".to_string()
    } else {
        path.clone()
    };

    SchemaViolation {
        span: find_path_span(content, &path),
        message: format!("{}: {}", location, error),
        hint: "does not match schema".to_string(),
    }
}

/// Best-effort location of a JSON-pointer path in the YAML source: look for
/// the last named segment as a mapping key; fall back to the document start.
fn find_path_span(content: &str, path: &str) -> SourceSpan {
    let key = path
        .rsplit('/')
        .find(|seg| !seg.is_empty() && seg.parse::<usize>().is_err());

    if let Some(key) = key {
        let needle = format!("{}:", key);
        let mut offset = 0;
        for line in content.split_inclusive('\n') {
            if let Some(col) = line.find(&needle) {
                return SourceSpan::from(offset + col..offset + col + key.len());
            }
            offset += line.len();
        }
    }

    SourceSpan::from(0..content.len().min(1))
}
