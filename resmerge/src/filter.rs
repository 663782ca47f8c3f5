//! Include/exclude filters for input discovery.
//!
//! Patterns are regular expressions in which `*` is shorthand for `.*`, and
//! must match the whole file name (or directory). A pattern that does not
//! compile is counted and disables the filter: nothing matches until the
//! patterns are fixed, so a typo never widens the selection.

use std::path::Path;

use regex::Regex;

use crate::{
    error::Error,
    path_format::{directory, file_name},
};

/// Which list a pattern belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    IncludeFile,
    ExcludeFile,
    IncludePath,
    ExcludePath,
}

/// Compiles a wildcard pattern into an anchored regex.
pub fn compile_pattern(pattern: &str) -> Result<Regex, Error> {
    let expanded = pattern.replace('*', ".*");
    Regex::new(&format!("^(?:{})$", expanded)).map_err(|e| Error::pattern_error(pattern, e))
}

fn any_match(patterns: &[Regex], name: &str, when_empty: bool) -> bool {
    if patterns.is_empty() || name.is_empty() {
        return when_empty;
    }
    patterns.iter().any(|re| re.is_match(name))
}

/// File selection by name and directory.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    include_files: Vec<Regex>,
    exclude_files: Vec<Regex>,
    include_paths: Vec<Regex>,
    exclude_paths: Vec<Regex>,
    pattern_errors: usize,
}

impl FileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a pattern. On failure the error is counted and also returned so
    /// the caller can report it.
    pub fn add(&mut self, kind: PatternKind, pattern: &str) -> Result<(), Error> {
        let re = match compile_pattern(pattern) {
            Ok(re) => re,
            Err(e) => {
                self.pattern_errors += 1;
                return Err(e);
            }
        };
        match kind {
            PatternKind::IncludeFile => self.include_files.push(re),
            PatternKind::ExcludeFile => self.exclude_files.push(re),
            PatternKind::IncludePath => self.include_paths.push(re),
            PatternKind::ExcludePath => self.exclude_paths.push(re),
        }
        Ok(())
    }

    /// Number of patterns that failed to compile.
    pub fn pattern_errors(&self) -> usize {
        self.pattern_errors
    }

    /// Whether `path` is selected.
    pub fn matches<P: AsRef<Path>>(&self, path: P) -> bool {
        if self.pattern_errors > 0 {
            return false;
        }
        let full = path.as_ref().to_string_lossy();
        let name = file_name(&full);
        let dirs = directory(&full);

        !name.is_empty()
            && !any_match(&self.exclude_files, name, false)
            && any_match(&self.include_files, name, true)
            && !any_match(&self.exclude_paths, dirs, false)
            && any_match(&self.include_paths, dirs, true)
    }
}
