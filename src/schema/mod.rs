//! Schema system - embedded JSON Schemas and starter templates

pub mod template;
pub mod validator;

pub use template::{TemplateError, TemplateGenerator};
pub use validator::{SchemaViolation, ValidationError, Validator};

use rust_embed::Embed;
use std::path::Path;

#[derive(Embed)]
#[folder = "schemas/"]
struct EmbeddedSchemas;

/// The project file kinds cft validates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Countries,
    Regions,
    Form,
}

impl SchemaKind {
    pub fn all() -> &'static [SchemaKind] {
        &[SchemaKind::Countries, SchemaKind::Regions, SchemaKind::Form]
    }

    /// Name of the embedded schema file
    pub fn schema_file(&self) -> &'static str {
        match self {
            SchemaKind::Countries => "countries.schema.json",
            SchemaKind::Regions => "regions.schema.json",
            SchemaKind::Form => "form.schema.json",
        }
    }

    /// Determine the kind from a file's location within a project
    pub fn for_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_string_lossy();
        if file_name == "countries.yaml" {
            return Some(SchemaKind::Countries);
        }

        let parent = path.parent()?.file_name()?.to_string_lossy();
        match parent.as_ref() {
            "regions" => Some(SchemaKind::Regions),
            "forms" => Some(SchemaKind::Form),
            _ => None,
        }
    }

    /// The embedded schema source, if present
    pub fn schema_source(&self) -> Option<String> {
        EmbeddedSchemas::get(self.schema_file())
            .and_then(|f| String::from_utf8(f.data.into_owned()).ok())
    }
}
