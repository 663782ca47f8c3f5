//! A merge run: master files, then a separator, then update files.
//!
//! [`MergeSession`] owns the [`DocumentSet`] for the whole run and keeps the
//! counters printed at the end. Files are processed one at a time; a file
//! that cannot be read or parsed is counted and the run goes on.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};
use serde::Serialize;

use crate::{
    diagnostic::Diagnostic,
    document::DocumentSet,
    encoding::load_file,
    error::Error,
    options::{ParseMode, SessionOptions, WriteOptions},
    writer::{WriteResult, write_documents},
};

/// Counts for one parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub master: bool,
    pub rows: usize,
    pub data: usize,
    pub meta: usize,
    /// Totals over all documents after this file.
    pub updates: usize,
    pub extras: usize,
}

/// Result of [`MergeSession::process_input`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// The input was the separator; later files are update files.
    Separator,
    Parsed(FileReport),
}

/// Counters for the end-of-run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub documents: usize,
    pub parsed_files: usize,
    pub failed_files: usize,
    pub io_errors: usize,
    pub pattern_errors: usize,
    pub updates: usize,
    pub extras: usize,
    pub warnings: usize,
}

impl RunSummary {
    /// Whether any file could not be read, parsed, or selected.
    pub fn has_errors(&self) -> bool {
        self.failed_files > 0 || self.io_errors > 0 || self.pattern_errors > 0
    }
}

/// Everything a run produced, as written by `--report-json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    pub summary: RunSummary,
    pub files: &'a [FileReport],
    pub diagnostics: &'a [Diagnostic],
    pub outputs: &'a [WriteResult],
}

impl RunReport<'_> {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// State of one merge run.
#[derive(Debug)]
pub struct MergeSession {
    options: SessionOptions,
    mode: ParseMode,
    documents: DocumentSet,
    diagnostics: Vec<Diagnostic>,
    files: Vec<FileReport>,
    parsed_files: usize,
    failed_files: usize,
    io_errors: usize,
    pattern_errors: usize,
}

impl MergeSession {
    pub fn new(options: SessionOptions) -> Self {
        MergeSession {
            options,
            mode: ParseMode::Master,
            documents: DocumentSet::new(),
            diagnostics: Vec::new(),
            files: Vec::new(),
            parsed_files: 0,
            failed_files: 0,
            io_errors: 0,
            pattern_errors: 0,
        }
    }

    pub fn mode(&self) -> ParseMode {
        self.mode
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Reports of the files parsed so far, in order.
    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Whether `input` is the token that starts the update files.
    pub fn is_separator<P: AsRef<Path>>(&self, input: P) -> bool {
        input.as_ref().as_os_str() == self.options.separator.as_str()
    }

    /// Switches to update files. With `reset_values` every master value is
    /// emptied first, so each merged key is recorded as an update.
    pub fn enter_update_mode(&mut self) {
        if self.options.reset_values {
            self.documents.clear_data_values();
        }
        self.mode = ParseMode::Update;
        tracing::debug!("switching to update files");
    }

    /// Adds filter patterns that failed to compile to the summary.
    pub fn add_pattern_errors(&mut self, count: usize) {
        self.pattern_errors += count;
    }

    /// Handles one input: the separator, or a file to load and parse.
    pub fn process_input<P: AsRef<Path>>(&mut self, path: P) -> Result<InputOutcome, Error> {
        let path = path.as_ref();
        if self.is_separator(path) {
            self.enter_update_mode();
            return Ok(InputOutcome::Separator);
        }
        self.process_file(path).map(InputOutcome::Parsed)
    }

    /// Loads and parses the file at `path` in the current mode.
    pub fn process_file<P: AsRef<Path>>(&mut self, path: P) -> Result<FileReport, Error> {
        let path = path.as_ref();
        let source = match load_file(path) {
            Ok(source) => source,
            Err(e) => {
                self.io_errors += 1;
                tracing::error!("unable to read {}: {}", path.display(), e);
                return Err(e);
            }
        };
        self.parse_source(path, &source.bytes, source.encoding)
    }

    /// Parses already loaded `source` as the file at `path`. The bytes are
    /// written back unchanged apart from merged entries.
    pub fn process_source<P: AsRef<Path>, S: AsRef<[u8]> + ?Sized>(
        &mut self,
        path: P,
        source: &S,
    ) -> Result<FileReport, Error> {
        self.parse_source(path.as_ref(), source.as_ref(), UTF_8)
    }

    fn parse_source(
        &mut self,
        path: &Path,
        source: &[u8],
        encoding: &'static Encoding,
    ) -> Result<FileReport, Error> {
        if self.mode.is_master() {
            self.documents.get_or_insert(path).encoding = encoding;
        }
        let parsed = self.documents.parse(
            path,
            source,
            self.mode,
            &self.options.parse,
            &mut self.diagnostics,
        );
        if let Err(e) = parsed {
            self.failed_files += 1;
            if e.is_file_local() {
                tracing::error!("failed to parse {}: {}", path.display(), e);
            } else {
                tracing::error!("nothing to merge {} into: {}", path.display(), e);
            }
            return Err(e);
        }

        self.parsed_files += 1;
        tracing::debug!("parsed: {}", path.display());
        let report = self.file_report(path);
        self.files.push(report.clone());
        Ok(report)
    }

    fn file_report(&self, path: &Path) -> FileReport {
        let (rows, data, meta) = match self.documents.get(path) {
            Some(doc) if self.mode.is_master() => (doc.rows.len(), doc.data.len(), doc.meta.len()),
            _ => (0, 0, 0),
        };
        FileReport {
            path: path.to_path_buf(),
            master: self.mode.is_master(),
            rows,
            data,
            meta,
            updates: self.documents.update_count(),
            extras: self.documents.extra_count(),
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            documents: self.documents.len(),
            parsed_files: self.parsed_files,
            failed_files: self.failed_files,
            io_errors: self.io_errors,
            pattern_errors: self.pattern_errors,
            updates: self.documents.update_count(),
            extras: self.documents.extra_count(),
            warnings: self.diagnostics.len(),
        }
    }

    pub fn report<'a>(&'a self, outputs: &'a [WriteResult]) -> RunReport<'a> {
        RunReport {
            summary: self.summary(),
            files: &self.files,
            diagnostics: &self.diagnostics,
            outputs,
        }
    }

    /// Writes the merged documents, see [`write_documents`].
    pub fn write_outputs<W: Write>(
        &self,
        template: &str,
        options: &WriteOptions,
        stdout: &mut W,
    ) -> Vec<WriteResult> {
        write_documents(&self.documents, template, options, stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::WriteOutcome;
    use std::fs;
    use tempfile::TempDir;

    const MASTER: &str = "<resources>\n    <string name=\"word1\">Your Drive</string>\n    <string name=\"word2\">Radar</string>\n</resources>\n";
    const UPDATE: &str = "<resources>\n    <string name=\"word1\">Votre Disque</string>\n    <string name=\"word3\">X</string>\n</resources>\n";

    fn round_trip_file(bytes: &[u8]) -> (RunSummary, Vec<u8>) {
        let temp_dir = TempDir::new().unwrap();
        let master = temp_dir.path().join("strings.xml");
        fs::write(&master, bytes).unwrap();

        let mut session = MergeSession::new(SessionOptions::new());
        session.process_input(&master).unwrap();
        let mut stdout = Vec::new();
        session.write_outputs("-", &WriteOptions::new(), &mut stdout);
        (session.summary(), stdout)
    }

    #[test]
    fn test_latin1_master_round_trips() {
        let master = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n<!-- caf\xE9 -->\n<resources>\n    <string name=\"word1\">Caf\xE9</string>\n</resources>\n";
        let (summary, stdout) = round_trip_file(master);
        assert_eq!(summary.documents, 1);
        assert_eq!(summary.io_errors, 0);
        assert_eq!(summary.failed_files, 0);
        assert_eq!(stdout, master);
    }

    #[test]
    fn test_utf16_master_round_trips() {
        let mut master = vec![0xFF, 0xFE];
        for unit in MASTER.encode_utf16() {
            master.extend_from_slice(&unit.to_le_bytes());
        }
        let (summary, stdout) = round_trip_file(&master);
        assert_eq!(summary.documents, 1);
        assert_eq!(stdout, master);
    }

    #[test]
    fn test_utf16_master_keeps_encoding_after_merge() {
        let temp_dir = TempDir::new().unwrap();
        let master = temp_dir.path().join("strings.xml");
        let mut bytes = vec![0xFE, 0xFF];
        for unit in MASTER.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        fs::write(&master, bytes).unwrap();

        let mut session = MergeSession::new(SessionOptions::new());
        session.process_input(&master).unwrap();
        session.enter_update_mode();
        session.process_source("fr.xml", UPDATE).unwrap();

        let mut stdout = Vec::new();
        session.write_outputs("-", &WriteOptions::new(), &mut stdout);
        let (text, encoding, _) = encoding_rs::UTF_16BE.decode(&stdout);
        assert_eq!(encoding, encoding_rs::UTF_16BE);
        assert!(text.contains("<string name=\"word1\">Votre Disque</string>"));
    }

    #[test]
    fn test_separator_switches_mode() {
        let mut session = MergeSession::new(SessionOptions::new());
        assert_eq!(session.mode(), ParseMode::Master);
        assert_eq!(session.process_input(",").unwrap(), InputOutcome::Separator);
        assert_eq!(session.mode(), ParseMode::Update);
        assert!(session.documents().is_empty());
    }

    #[test]
    fn test_full_run_counts() {
        let mut session = MergeSession::new(SessionOptions::new());
        let report = session.process_source("a/strings.xml", MASTER).unwrap();
        assert!(report.master);
        assert_eq!(report.data, 2);
        assert_eq!(report.rows, report.data + report.meta);

        session.process_source("b/strings.xml", MASTER).unwrap();
        session.enter_update_mode();
        let report = session.process_source("fr/strings.xml", UPDATE).unwrap();
        assert!(!report.master);
        assert_eq!(report.updates, 1);
        assert_eq!(report.extras, 2);

        let summary = session.summary();
        assert_eq!(summary.documents, 2);
        assert_eq!(summary.parsed_files, 3);
        assert_eq!(summary.updates, 1);
        // word3 is an extra in both masters
        assert_eq!(summary.extras, 2);
        // second master also holds word1; word3 is unmatched
        assert_eq!(summary.warnings, 2);
        assert!(!summary.has_errors());
    }

    #[test]
    fn test_reset_values_marks_every_key() {
        let mut session = MergeSession::new(SessionOptions::new().with_reset_values(true));
        session.process_source("a.xml", MASTER).unwrap();
        session.process_input(",").unwrap();
        session.process_source("fr.xml", MASTER).unwrap();
        assert_eq!(session.summary().updates, 2);
    }

    #[test]
    fn test_failures_are_counted() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = MergeSession::new(SessionOptions::new());

        let missing = temp_dir.path().join("missing.xml");
        assert!(matches!(session.process_input(&missing), Err(Error::Io(_))));

        let bad = temp_dir.path().join("bad.xml");
        fs::write(&bad, "<resources>\n<oops\n").unwrap();
        assert!(matches!(session.process_input(&bad), Err(Error::Structure { .. })));

        let good = temp_dir.path().join("good.xml");
        fs::write(&good, MASTER).unwrap();
        session.process_input(&good).unwrap();

        let summary = session.summary();
        assert_eq!(summary.io_errors, 1);
        assert_eq!(summary.failed_files, 1);
        assert_eq!(summary.parsed_files, 1);
        // the failed file keeps its partial document
        assert_eq!(summary.documents, 2);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_write_outputs_to_stdout() {
        let mut session = MergeSession::new(SessionOptions::new());
        session.process_source("a.xml", MASTER).unwrap();
        let mut stdout = Vec::new();
        let results = session.write_outputs("-", &WriteOptions::new(), &mut stdout);
        assert_eq!(results[0].outcome, WriteOutcome::Stdout);
        assert_eq!(String::from_utf8(stdout).unwrap(), MASTER);
    }

    #[test]
    fn test_report_json() {
        let mut session = MergeSession::new(SessionOptions::new());
        session.process_source("a.xml", MASTER).unwrap();
        session.enter_update_mode();
        session.process_source("fr.xml", UPDATE).unwrap();
        assert_eq!(session.files().len(), 2);

        let results = session.write_outputs("-", &WriteOptions::new(), &mut Vec::new());
        let json = session.report(&results).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["updates"], 1);
        assert_eq!(value["summary"]["extras"], 1);
        assert_eq!(value["files"][1]["master"], false);
        assert_eq!(value["diagnostics"][0]["kind"], "unmatched_extra");
        assert_eq!(value["outputs"][0]["status"], "stdout");
    }
}
