//! Load-time errors
//!
//! These are distinct from compatibility findings: a schema that fails to load
//! is never analyzed.

use serde::{Deserialize, Serialize};

/// One structural problem found while validating a loaded schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Qualified path of the message or enum
    pub type_path: String,

    /// Field or constant involved, if any
    pub member: Option<String>,

    /// What is wrong
    pub message: String,
}

impl ValidationIssue {
    pub fn new(type_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_path: type_path.into(),
            member: None,
            message: message.into(),
        }
    }

    pub fn for_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(member) = &self.member {
            write!(f, "\n  for {}", member)?;
        }
        write!(f, "\n  in {}", self.type_path)
    }
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors raised while loading or indexing a schema
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {0}: {1}")]
    IoError(String, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Descriptor decode error: {0}")]
    DecodeError(String),

    #[error("Duplicate type path: {0}")]
    DuplicateTypePath(String),

    #[error("Unsupported schema format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid schema:\n{}", format_issues(.0))]
    Invalid(Vec<ValidationIssue>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_display_includes_context() {
        let issue = ValidationIssue::new("message Message", "tag 1 is reserved")
            .for_member("field name");
        assert_eq!(
            issue.to_string(),
            "tag 1 is reserved\n  for field name\n  in message Message"
        );
    }

    #[test]
    fn invalid_error_lists_every_issue() {
        let err = LoadError::Invalid(vec![
            ValidationIssue::new("message A", "first"),
            ValidationIssue::new("message B", "second"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("Invalid schema:"));
        assert!(text.contains("first"));
        assert!(text.contains("second"));
    }
}
