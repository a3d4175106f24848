//! Starter file templates rendered on project initialization

use chrono::Utc;
use rust_embed::Embed;
use tera::Tera;
use thiserror::Error;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("template rendering error: {0}")]
    Render(String),
}

/// Template generator over the embedded starter files
pub struct TemplateGenerator {
    tera: Tera,
}

impl TemplateGenerator {
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::Render(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// Render one embedded template with the given context
    pub fn render(&self, name: &str, context: &tera::Context) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        self.tera
            .render(name, context)
            .map_err(|e| TemplateError::Render(e.to_string()))
    }

    /// The context used for starter files
    pub fn starter_context(project_name: &str) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("project_name", project_name);
        context.insert("created", &Utc::now().format("%Y-%m-%d").to_string());
        context
    }
}
