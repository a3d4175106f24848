//! Form definition files
//!
//! A form definition declares the static field set, the cascade bindings
//! (parent -> dependent field), toggle-gated sections, and form-level
//! submission flags. Dependent fields are deliberately NOT part of the
//! static field list; the pipeline introduces them when their parent value
//! warrants it.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::field::{ChoiceSource, FieldDescriptor, WidgetKind};
use crate::core::snapshot::FormSnapshot;
use crate::yaml::{self, YamlError};

/// A statically declared field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(default)]
    pub widget: WidgetKind,

    #[serde(default)]
    pub required: bool,

    /// Section this field belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Keep the previously persisted value when the submission leaves this
    /// field blank (used for secrets that are not echoed back)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub preserve_on_blank: bool,

    /// Fixed choice list for select widgets
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

/// A dependent-field binding: `field` exists only when `parent` has
/// dependent values in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CascadeDef {
    /// The declared field whose value drives the cascade
    pub parent: String,

    /// The dependent field introduced by the pipeline
    pub field: String,

    /// Free-text fallback field used when no structured value applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,

    /// Widget of the dependent field when first introduced
    #[serde(default = "default_cascade_widget")]
    pub widget: WidgetKind,
}

fn default_cascade_widget() -> WidgetKind {
    WidgetKind::Select
}

/// A group of fields gated by a toggle field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDef {
    pub name: String,

    /// Checkbox-style field; when off or absent the section's submitted
    /// values are dropped
    pub toggle: String,
}

/// A complete form definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDefinition {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub fields: Vec<FieldDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cascades: Vec<CascadeDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<SectionDef>,

    /// Discard the bound record when every submitted value is empty
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub discard_when_empty: bool,
}

impl FormDefinition {
    /// Load a definition from a YAML file
    pub fn load(path: &Path) -> Result<Self, YamlError> {
        yaml::parse_yaml_file(path)
    }

    /// Check internal consistency of the definition
    pub fn check(&self) -> Result<(), DefinitionError> {
        let mut seen = std::collections::BTreeSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(DefinitionError::DuplicateField(field.name.clone()));
            }
        }

        let declared = |name: &str| self.fields.iter().any(|f| f.name == name);

        for cascade in &self.cascades {
            if !declared(&cascade.parent) {
                return Err(DefinitionError::UnknownParent {
                    field: cascade.field.clone(),
                    parent: cascade.parent.clone(),
                });
            }
            if declared(&cascade.field) {
                return Err(DefinitionError::DependentDeclared(cascade.field.clone()));
            }
            if let Some(fallback) = &cascade.fallback {
                if !declared(fallback) {
                    return Err(DefinitionError::UnknownFallback {
                        field: cascade.field.clone(),
                        fallback: fallback.clone(),
                    });
                }
            }
        }

        for section in &self.sections {
            if !declared(&section.toggle) {
                return Err(DefinitionError::UnknownToggle {
                    section: section.name.clone(),
                    toggle: section.toggle.clone(),
                });
            }
        }

        let section_names: Vec<&str> = self.sections.iter().map(|s| s.name.as_str()).collect();
        for field in &self.fields {
            if let Some(section) = &field.section {
                if !section_names.contains(&section.as_str()) {
                    return Err(DefinitionError::UnknownSection {
                        field: field.name.clone(),
                        section: section.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Build the initial snapshot over the statically declared fields
    pub fn snapshot(&self) -> FormSnapshot {
        let fields = self
            .fields
            .iter()
            .map(|f| {
                let choices = if f.choices.is_empty() {
                    ChoiceSource::None
                } else {
                    ChoiceSource::Static(f.choices.clone())
                };
                FieldDescriptor::new(&f.name, f.widget)
                    .required(f.required)
                    .section(f.section.clone())
                    .preserve_on_blank(f.preserve_on_blank)
                    .choices(choices)
            })
            .collect();
        FormSnapshot::new(fields)
    }

    /// Names of the declared fields belonging to a section
    pub fn section_fields(&self, section: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.section.as_deref() == Some(section))
            .map(|f| f.name.clone())
            .collect()
    }
}

/// Structural errors in a form definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    #[error("cascade for '{field}' references undeclared parent field '{parent}'")]
    UnknownParent { field: String, parent: String },

    #[error("dependent field '{0}' must not appear in the static field list")]
    DependentDeclared(String),

    #[error("cascade for '{field}' references undeclared fallback field '{fallback}'")]
    UnknownFallback { field: String, fallback: String },

    #[error("section '{section}' references undeclared toggle field '{toggle}'")]
    UnknownToggle { section: String, toggle: String },

    #[error("field '{field}' references unknown section '{section}'")]
    UnknownSection { field: String, section: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_form() -> FormDefinition {
        serde_yml::from_str(
            r#"
name: address
title: Postal address
fields:
  - name: street
    widget: text
  - name: city
    widget: text
  - name: country
    widget: select
    required: true
  - name: region_text
    widget: text
cascades:
  - parent: country
    field: region
    fallback: region_text
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_and_check() {
        let form = address_form();
        assert_eq!(form.name, "address");
        assert_eq!(form.cascades.len(), 1);
        assert_eq!(form.cascades[0].widget, WidgetKind::Select);
        form.check().unwrap();
    }

    #[test]
    fn test_snapshot_declares_static_fields_only() {
        let form = address_form();
        let snap = form.snapshot();
        assert!(snap.has_field("country"));
        assert!(snap.has_field("region_text"));
        assert!(!snap.has_field("region"));
    }

    #[test]
    fn test_check_rejects_declared_dependent() {
        let mut form = address_form();
        form.fields.push(FieldDef {
            name: "region".to_string(),
            widget: WidgetKind::Select,
            required: false,
            section: None,
            preserve_on_blank: false,
            choices: Vec::new(),
        });
        let err = form.check().unwrap_err();
        assert!(matches!(err, DefinitionError::DependentDeclared(_)));
    }

    #[test]
    fn test_check_rejects_unknown_parent() {
        let mut form = address_form();
        form.cascades[0].parent = "nation".to_string();
        let err = form.check().unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownParent { .. }));
    }

    #[test]
    fn test_check_rejects_unknown_toggle() {
        let mut form = address_form();
        form.sections.push(SectionDef {
            name: "shipping".to_string(),
            toggle: "use_shipping".to_string(),
        });
        let err = form.check().unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownToggle { .. }));
    }

    #[test]
    fn test_section_fields() {
        let form: FormDefinition = serde_yml::from_str(
            r#"
name: mail
fields:
  - name: use_imap
    widget: checkbox
  - name: imap_host
    widget: text
    section: imap
  - name: imap_port
    widget: number
    section: imap
sections:
  - name: imap
    toggle: use_imap
"#,
        )
        .unwrap();
        form.check().unwrap();
        assert_eq!(form.section_fields("imap"), vec!["imap_host", "imap_port"]);
    }
}
