use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for prerelease operations
#[derive(Error, Debug)]
pub enum PrereleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Diff error: {0}")]
    Diff(String),

    #[error("Remote operation failed: {0}")]
    Remote(String),

    #[error("Cannot read schema file '{}': {source}", path.display())]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in prerelease
pub type Result<T> = std::result::Result<T, PrereleaseError>;

impl PrereleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        PrereleaseError::Config(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        PrereleaseError::Tag(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        PrereleaseError::Branch(msg.into())
    }

    /// Create a diff error with context
    pub fn diff(msg: impl Into<String>) -> Self {
        PrereleaseError::Diff(msg.into())
    }

    /// Create a remote error with context
    pub fn remote(msg: impl Into<String>) -> Self {
        PrereleaseError::Remote(msg.into())
    }

    /// Wrap a failed working-copy read of a schema file
    pub fn schema_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PrereleaseError::SchemaFile {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrereleaseError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PrereleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_schema_file_error_names_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        let err = PrereleaseError::schema_file("db/migrations/001.sql", io_err);
        let msg = err.to_string();
        assert!(msg.contains("db/migrations/001.sql"));
        assert!(msg.contains("No such file"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (PrereleaseError::config("x"), "Configuration error"),
            (PrereleaseError::tag("x"), "Tag error"),
            (PrereleaseError::branch("x"), "Branch error"),
            (PrereleaseError::diff("x"), "Diff error"),
            (PrereleaseError::remote("x"), "Remote operation failed"),
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
}
