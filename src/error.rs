//! Error types for the gendoku library
//!
//! Every failure in the pipeline is fatal to the build. Errors carry enough
//! context (a file path, a template name, the offending value) to diagnose
//! the problem from the command line.

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for all library operations
#[derive(Error, Debug)]
pub enum GendokuError {
    /// Front matter is not valid structured data
    #[error("Invalid front matter in {path}: {reason}")]
    MetadataParse { path: PathBuf, reason: String },

    /// Undefined reference, broken extends/block chain or template syntax error
    #[error("Template error in {origin}: {reason}")]
    TemplateRender { origin: String, reason: String },

    /// The `dateformat` filter received a value it cannot read as a date
    #[error("Cannot interpret {value:?} as a date")]
    DateParse { value: String },

    /// Unreadable file or directory
    #[error("I/O error at {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Lookup of a key that does not exist
    #[error("No such key: {key}")]
    MissingKey { key: String },

    /// Configuration file is not a usable mapping
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// A path in the document tree is taken by a node of the other kind
    #[error("Document tree conflict at {path}")]
    TreeConflict { path: String },

    /// The external document compiler exited unsuccessfully
    #[error("Compiler command `{command}` failed with {status}")]
    Compiler { command: String, status: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GendokuError>;

impl GendokuError {
    /// Create a new metadata parse error
    pub fn metadata_parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::MetadataParse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new template render error
    pub fn template_render(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TemplateRender {
            origin: origin.into(),
            reason: reason.into(),
        }
    }

    /// Create a new date parse error
    pub fn date_parse(value: impl Into<String>) -> Self {
        Self::DateParse {
            value: value.into(),
        }
    }

    /// Create a new file system error
    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Create a new missing key error
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// Create a new configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a new tree conflict error
    pub fn tree_conflict(path: impl Into<String>) -> Self {
        Self::TreeConflict { path: path.into() }
    }

    /// Create a new compiler error
    pub fn compiler(command: impl Into<String>, status: impl Into<String>) -> Self {
        Self::Compiler {
            command: command.into(),
            status: status.into(),
        }
    }

    /// Find the innermost gendoku error in a source chain.
    ///
    /// Template engine errors wrap the errors raised by nested renders and
    /// filters; the innermost one names the document or value at fault.
    pub fn find_in_chain<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a GendokuError> {
        let mut found = None;
        let mut current: Option<&'a (dyn StdError + 'static)> = Some(err);
        while let Some(e) = current {
            if let Some(ours) = e.downcast_ref::<GendokuError>() {
                found = Some(ours);
            }
            current = e.source();
        }
        found
    }
}

impl Clone for GendokuError {
    fn clone(&self) -> Self {
        match self {
            Self::MetadataParse { path, reason } => Self::MetadataParse {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::TemplateRender { origin, reason } => Self::TemplateRender {
                origin: origin.clone(),
                reason: reason.clone(),
            },
            Self::DateParse { value } => Self::DateParse {
                value: value.clone(),
            },
            Self::FileSystem { path, source } => {
                // std::io::Error doesn't implement Clone
                Self::FileSystem {
                    path: path.clone(),
                    source: std::io::Error::new(source.kind(), source.to_string()),
                }
            }
            Self::MissingKey { key } => Self::MissingKey { key: key.clone() },
            Self::Config { reason } => Self::Config {
                reason: reason.clone(),
            },
            Self::TreeConflict { path } => Self::TreeConflict { path: path.clone() },
            Self::Compiler { command, status } => Self::Compiler {
                command: command.clone(),
                status: status.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapper(GendokuError);

    impl std::fmt::Display for Wrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "wrapped")
        }
    }

    impl StdError for Wrapper {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_error_display() {
        let err = GendokuError::metadata_parse("content/a.md", "expected a mapping");
        let display = format!("{err}");
        assert!(display.contains("content/a.md"));
        assert!(display.contains("expected a mapping"));

        let err = GendokuError::date_parse("yesterday");
        assert_eq!(format!("{err}"), "Cannot interpret \"yesterday\" as a date");
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = GendokuError::file_system(
            "content",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.source().is_some());
        assert!(format!("{err}").contains("content"));
    }

    #[test]
    fn test_error_cloning() {
        let original = GendokuError::file_system(
            "content/x.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        match original.clone() {
            GendokuError::FileSystem { path, source } => {
                assert_eq!(path, PathBuf::from("content/x.md"));
                assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            }
            other => panic!("Cloned error doesn't match original: {other:?}"),
        }
    }

    #[test]
    fn test_find_in_chain() {
        let wrapped = Wrapper(GendokuError::date_parse("soon"));
        let found = GendokuError::find_in_chain(&wrapped).unwrap();
        assert!(matches!(found, GendokuError::DateParse { .. }));

        let plain = std::io::Error::new(std::io::ErrorKind::Other, "nope");
        assert!(GendokuError::find_in_chain(&plain).is_none());
    }
}
