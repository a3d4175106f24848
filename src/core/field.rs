//! Field descriptors - the configuration records the pipeline rebinds
//!
//! A descriptor is replaced, never mutated: `rebuilt` derives a fresh
//! descriptor from an optional predecessor plus the new choice query,
//! carrying over everything that is not the choice list.

use serde::{Deserialize, Serialize};

use crate::catalog::query::RegionQuery;

/// Widget kinds a field can render as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum WidgetKind {
    #[default]
    Text,
    Select,
    Checkbox,
    Password,
    Number,
    Hidden,
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidgetKind::Text => write!(f, "text"),
            WidgetKind::Select => write!(f, "select"),
            WidgetKind::Checkbox => write!(f, "checkbox"),
            WidgetKind::Password => write!(f, "password"),
            WidgetKind::Number => write!(f, "number"),
            WidgetKind::Hidden => write!(f, "hidden"),
        }
    }
}

/// Where a field's legal values come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceSource {
    /// Free input, no choice list
    None,

    /// A fixed list known at declaration time
    Static(Vec<String>),

    /// A catalog-backed deferred query. Always evaluated lazily: the legal
    /// set depends on parent state that is not final until the lifecycle
    /// stage completes, so it is fetched by the renderer/validator on demand.
    Catalog(RegionQuery),
}

impl ChoiceSource {
    pub fn is_deferred(&self) -> bool {
        matches!(self, ChoiceSource::Catalog(_))
    }
}

/// Configuration record for a single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub widget: WidgetKind,
    pub required: bool,
    pub section: Option<String>,
    pub preserve_on_blank: bool,
    pub choices: ChoiceSource,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, widget: WidgetKind) -> Self {
        Self {
            name: name.into(),
            widget,
            required: false,
            section: None,
            preserve_on_blank: false,
            choices: ChoiceSource::None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn section(mut self, section: Option<String>) -> Self {
        self.section = section;
        self
    }

    pub fn preserve_on_blank(mut self, preserve: bool) -> Self {
        self.preserve_on_blank = preserve;
        self
    }

    pub fn choices(mut self, choices: ChoiceSource) -> Self {
        self.choices = choices;
        self
    }

    /// Build the replacement for a dependent field.
    ///
    /// If a previous descriptor exists its widget and non-choice
    /// configuration carry over; the old choice list is always discarded in
    /// favor of the new query. Without a predecessor the given widget is
    /// used and everything else starts from defaults.
    pub fn rebuilt(
        prev: Option<&FieldDescriptor>,
        name: &str,
        widget: WidgetKind,
        query: RegionQuery,
    ) -> Self {
        match prev {
            Some(prev) => Self {
                name: name.to_string(),
                widget: prev.widget,
                required: prev.required,
                section: prev.section.clone(),
                preserve_on_blank: prev.preserve_on_blank,
                choices: ChoiceSource::Catalog(query),
            },
            None => Self::new(name, widget).choices(ChoiceSource::Catalog(query)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(code: &str) -> RegionQuery {
        RegionQuery::for_country(code.parse().unwrap())
    }

    #[test]
    fn test_rebuilt_without_predecessor_uses_given_widget() {
        let desc = FieldDescriptor::rebuilt(None, "region", WidgetKind::Select, query("US"));
        assert_eq!(desc.name, "region");
        assert_eq!(desc.widget, WidgetKind::Select);
        assert!(!desc.required);
        assert!(desc.choices.is_deferred());
    }

    #[test]
    fn test_rebuilt_carries_over_non_choice_config() {
        let prev = FieldDescriptor::new("region", WidgetKind::Hidden)
            .required(true)
            .choices(ChoiceSource::Static(vec!["stale".to_string()]));

        let desc = FieldDescriptor::rebuilt(Some(&prev), "region", WidgetKind::Select, query("DE"));

        // widget and required come from the predecessor, choices do not
        assert_eq!(desc.widget, WidgetKind::Hidden);
        assert!(desc.required);
        match desc.choices {
            ChoiceSource::Catalog(q) => assert_eq!(q.country().as_str(), "DE"),
            other => panic!("expected catalog choices, got {:?}", other),
        }
    }

    #[test]
    fn test_widget_kind_serde_names() {
        let yaml = serde_yml::to_string(&WidgetKind::Select).unwrap();
        assert_eq!(yaml.trim(), "select");
        let parsed: WidgetKind = serde_yml::from_str("checkbox").unwrap();
        assert_eq!(parsed, WidgetKind::Checkbox);
    }
}
