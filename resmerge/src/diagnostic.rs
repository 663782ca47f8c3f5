//! Non-fatal findings collected while parsing and merging.

use std::{fmt, path::PathBuf};

use serde::Serialize;

/// A warning raised during a run. None of these stop the file being parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A master file defines the same key twice with different text.
    DuplicateKey {
        path: PathBuf,
        key: String,
        old: String,
        new: String,
    },
    /// A `<string ` statement could not be validated; it was kept as a block.
    InvalidStringEntry {
        path: PathBuf,
        line: usize,
        text: String,
    },
    /// A second master document also holds a key already updated in an earlier one.
    CrossDocumentDuplicate { path: PathBuf, key: String },
    /// An update file supplies a key that no master document holds.
    UnmatchedExtra { path: PathBuf, text: String },
}

impl Diagnostic {
    /// Short machine-friendly label, the same as the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::DuplicateKey { .. } => "duplicate_key",
            Diagnostic::InvalidStringEntry { .. } => "invalid_string_entry",
            Diagnostic::CrossDocumentDuplicate { .. } => "cross_document_duplicate",
            Diagnostic::UnmatchedExtra { .. } => "unmatched_extra",
        }
    }

    /// Logs the diagnostic and appends it to `sink`.
    pub fn report(self, sink: &mut Vec<Diagnostic>) {
        match &self {
            Diagnostic::InvalidStringEntry { .. } => tracing::error!(kind = self.kind(), "{}", self),
            _ => tracing::warn!(kind = self.kind(), "{}", self),
        }
        sink.push(self);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateKey {
                path,
                key,
                old,
                new,
            } => write!(
                f,
                "duplicate: {} in {} (old={}, new={})",
                key,
                path.display(),
                old.trim_end(),
                new.trim_end()
            ),
            Diagnostic::InvalidStringEntry { path, line, text } => {
                write!(f, "line {}: unknown: {}, in: {}", line, text, path.display())
            }
            Diagnostic::CrossDocumentDuplicate { path, key } => {
                write!(f, "duplicate: {}, file={}", key, path.display())
            }
            Diagnostic::UnmatchedExtra { path, text } => {
                write!(f, "extra: {}, in: {}", text.trim_end(), path.display())
            }
        }
    }
}
