//! All error types for the resmerge crate.
//!
//! Fatal conditions are returned as [`Error`]. Anything a run can keep going
//! past (duplicate keys, bad `<string>` entries, unmatched keys) is a
//! [`crate::diagnostic::Diagnostic`] instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("line {line}: unknown statement `{excerpt}` in {}", path.display())]
    Structure {
        path: PathBuf,
        line: usize,
        excerpt: String,
    },

    #[error("no master documents have been parsed")]
    NoMasterDocuments,

    #[error("invalid output template: {0}")]
    Template(String),

    #[error("report error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new pattern compile error.
    pub fn pattern_error(pattern: impl Into<String>, source: regex::Error) -> Self {
        Error::Pattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates a fatal structural parse error.
    pub fn structure_error(
        path: impl Into<PathBuf>,
        line: usize,
        excerpt: impl Into<String>,
    ) -> Self {
        Error::Structure {
            path: path.into(),
            line,
            excerpt: excerpt.into(),
        }
    }

    /// Whether the error only affects the file being parsed.
    pub fn is_file_local(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::InvalidEncoding(_) | Error::Structure { .. }
        )
    }
}
