//! YAML error diagnostics with source locations

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// YAML syntax error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("YAML syntax error: {message}")]
#[diagnostic(code(cft::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Build a located diagnostic from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = offset_of(source, line, column).min(source.len());
        let message = err.to_string();
        let help = hint_for(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..(offset + 1).min(source.len())),
            help,
            message,
        }
    }
}

/// Generic YAML error wrapper
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convert a 1-based line/column pair to a byte offset
fn offset_of(source: &str, line: usize, column: usize) -> usize {
    let mut start = 0;
    for (n, text) in source.split_inclusive('\n').enumerate() {
        if n + 1 == line {
            return start + column.saturating_sub(1).min(text.len());
        }
        start += text.len();
    }
    source.len().saturating_sub(1)
}

fn hint_for(message: &str) -> Option<String> {
    let lower = message.to_lowercase();

    if lower.contains("tab") {
        return Some("YAML indentation must use spaces, not tabs".to_string());
    }
    if lower.contains("duplicate key") {
        return Some("each key may appear only once per mapping".to_string());
    }
    if lower.contains("mapping values are not allowed") {
        return Some("a space may be missing after ':', or the indentation is off".to_string());
    }
    if lower.contains("expected block end") {
        return Some("check for inconsistent indentation above this line".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_of() {
        let source = "first\nsecond\nthird";
        assert_eq!(offset_of(source, 1, 1), 0);
        assert_eq!(offset_of(source, 2, 1), 6);
        assert_eq!(offset_of(source, 3, 3), 15);
    }

    #[test]
    fn test_offset_of_clamps_to_source() {
        assert_eq!(offset_of("ab", 9, 9), 1);
    }

    #[test]
    fn test_hint_for() {
        assert!(hint_for("found a tab character").is_some());
        assert!(hint_for("duplicate key: country").is_some());
        assert!(hint_for("something else entirely").is_none());
    }

    #[test]
    fn test_from_serde_error_carries_message() {
        let err = serde_yml::from_str::<serde_yml::Value>("a: [b\n").unwrap_err();
        let diag = YamlSyntaxError::from_serde_error(&err, "a: [b\n", "test.yaml");
        assert!(!diag.message.is_empty());
    }
}
