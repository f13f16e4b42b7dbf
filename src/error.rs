use thiserror::Error;

use crate::remote::TransportError;

/// Unified error type for changelog generation
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Remote request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Could not find a starting point: {0}")]
    UnresolvableStartPoint(String),

    #[error("Malformed version: {0}")]
    MalformedVersion(String),

    #[error("Cannot parse repository reference: {0}")]
    UnparsableRepository(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-changelog
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ChangelogError::Config(msg.into())
    }

    /// Create a malformed version error with context
    pub fn malformed_version(msg: impl Into<String>) -> Self {
        ChangelogError::MalformedVersion(msg.into())
    }

    /// Create an unresolvable start point error with context
    pub fn unresolvable_start_point(msg: impl Into<String>) -> Self {
        ChangelogError::UnresolvableStartPoint(msg.into())
    }

    /// Create a repository reference error with context
    pub fn unparsable_repository(msg: impl Into<String>) -> Self {
        ChangelogError::UnparsableRepository(msg.into())
    }

    /// Create a template error with context
    pub fn template(msg: impl Into<String>) -> Self {
        ChangelogError::Template(msg.into())
    }

    /// Whether the error came from a transient upstream failure
    pub fn is_transient(&self) -> bool {
        matches!(self, ChangelogError::Transport(e) if e.is_retryable())
    }
}

impl From<handlebars::RenderError> for ChangelogError {
    fn from(err: handlebars::RenderError) -> Self {
        ChangelogError::Template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for ChangelogError {
    fn from(err: handlebars::TemplateError) -> Self {
        ChangelogError::Template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChangelogError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ChangelogError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_transport() {
        let err: ChangelogError = TransportError::new(Some(502), "bad gateway").into();
        assert!(err.is_transient());
        assert!(err.to_string().contains("bad gateway"));

        let err: ChangelogError = TransportError::new(Some(404), "not found").into();
        assert!(!err.is_transient());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (ChangelogError::config("x"), "Configuration error"),
            (ChangelogError::malformed_version("x"), "Malformed version"),
            (
                ChangelogError::unresolvable_start_point("x"),
                "Could not find a starting point",
            ),
            (
                ChangelogError::unparsable_repository("x"),
                "Cannot parse repository reference",
            ),
            (ChangelogError::template("x"), "Template error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }

    #[test]
    fn test_non_transport_errors_are_not_transient() {
        assert!(!ChangelogError::Cancelled.is_transient());
        assert!(!ChangelogError::malformed_version("1.x").is_transient());
    }
}
