//! Turns the text of one file into rows of a [`DocumentSet`].
//!
//! The parser walks the input statement by statement with a [`Scanner`].
//! In master mode every statement becomes a row of the file's document. In
//! update mode only `<string>` entries are kept, and each one is merged into
//! the master documents parsed before it.

use std::path::Path;

use crate::{
    diagnostic::Diagnostic,
    document::DocumentSet,
    error::Error,
    options::{BlockCloseMode, ParseMode, ParseOptions},
    scanner::{
        Scanner, Statement, StatementKind, clean, entry_text, lossy, meta_key, string_entry_name,
        tag_start,
    },
};

/// Number of characters quoted from the input when a statement cannot be read.
const EXCERPT_LEN: usize = 10;

/// Names of the blocks opened and not yet closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockStack {
    names: Vec<String>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes the tag name of an opening statement such as `<resources>\n`.
    pub fn push(&mut self, open_text: &[u8]) {
        let name = open_text
            .strip_prefix(b"<")
            .unwrap_or(open_text)
            .split(|b| b.is_ascii_whitespace() || matches!(*b, b'>' | b'/'))
            .next()
            .unwrap_or_default();
        self.names.push(lossy(name).into_owned());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    pub fn top(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `after_slash`, the text following `</`, closes the innermost block.
    pub fn closes_top(&self, after_slash: &[u8]) -> bool {
        let Some(name) = self.top().filter(|name| !name.is_empty()) else {
            return false;
        };
        after_slash.starts_with(name.as_bytes())
            && after_slash
                .get(name.len())
                .is_some_and(|b| *b == b'>' || b.is_ascii_whitespace())
    }
}

/// Reads the statements of one file in order, free text included.
struct StatementReader<'a, 'p> {
    path: &'p Path,
    options: &'p ParseOptions,
    scanner: Scanner<'a>,
    blocks: BlockStack,
    next_row: usize,
    /// End of the last statement returned.
    last: usize,
    done: bool,
}

impl<'a, 'p> StatementReader<'a, 'p> {
    fn new(path: &'p Path, source: &'a [u8], options: &'p ParseOptions) -> Self {
        StatementReader {
            path,
            options,
            scanner: Scanner::new(source),
            blocks: BlockStack::new(),
            next_row: 0,
            last: 0,
            done: false,
        }
    }

    fn next_key(&mut self) -> String {
        let key = meta_key(self.next_row);
        self.next_row += 1;
        key
    }

    fn meta(&mut self, kind: StatementKind, text: &'a [u8]) -> Statement<'a> {
        Statement {
            kind,
            key: self.next_key(),
            text,
        }
    }

    fn next_statement(
        &mut self,
        sink: &mut Vec<Diagnostic>,
    ) -> Result<Option<Statement<'a>>, Error> {
        if self.done {
            return Ok(None);
        }

        let source = self.scanner.source();
        if self.scanner.find_next(tag_start()).is_none() {
            self.done = true;
            if self.last < source.len() {
                let trailing = &source[self.last..];
                self.last = source.len();
                return Ok(Some(self.meta(StatementKind::FreeText, trailing)));
            }
            return Ok(None);
        }

        // Text before the tag becomes its own row; the tag is found again on the next call.
        let start = self.scanner.pos();
        if start > self.last {
            let gap = self.scanner.source().get(self.last..start).unwrap_or_default();
            self.last = start;
            return Ok(Some(self.meta(StatementKind::FreeText, gap)));
        }

        let statement = self.read_tag(start, sink)?;
        self.last = self.scanner.pos();
        Ok(Some(statement))
    }

    fn read_tag(
        &mut self,
        start: usize,
        sink: &mut Vec<Diagnostic>,
    ) -> Result<Statement<'a>, Error> {
        let classified = match self.scanner.classify() {
            Some(StatementKind::BlockClose) => self.close_block(start)?,
            Some(StatementKind::StringEntry) => self.string_entry(start, sink),
            Some(kind) => self.capture(kind),
            None => None,
        };
        if let Some(statement) = classified {
            return Ok(statement);
        }

        let end = StatementKind::BlockOpen.end_pattern();
        match end.and_then(|end| self.scanner.capture_until(end)) {
            Some(text) => {
                self.blocks.push(text);
                Ok(self.meta(StatementKind::BlockOpen, text))
            }
            None => Err(Error::structure_error(
                self.path,
                self.scanner.line_at(start),
                self.scanner.excerpt(EXCERPT_LEN),
            )),
        }
    }

    fn capture(&mut self, kind: StatementKind) -> Option<Statement<'a>> {
        let text = self.scanner.capture_until(kind.end_pattern()?)?;
        Some(self.meta(kind, text))
    }

    fn close_block(&mut self, start: usize) -> Result<Option<Statement<'a>>, Error> {
        let after_slash = self.scanner.rest().get(2..).unwrap_or_default();
        if !self.blocks.closes_top(after_slash) {
            if self.options.block_close == BlockCloseMode::Strict {
                return Err(Error::structure_error(
                    self.path,
                    self.scanner.line_at(start),
                    self.scanner.excerpt(EXCERPT_LEN),
                ));
            }
            tracing::debug!(
                line = self.scanner.line_at(start),
                open = self.blocks.top().unwrap_or_default(),
                "closing tag does not match open block, keeping it as a block"
            );
            return Ok(None);
        }

        let statement = self.capture(StatementKind::BlockClose);
        if statement.is_some() {
            self.blocks.pop();
        }
        Ok(statement)
    }

    fn string_entry(
        &mut self,
        start: usize,
        sink: &mut Vec<Diagnostic>,
    ) -> Option<Statement<'a>> {
        let line = self.scanner.line_at(start);
        let end = StatementKind::StringEntry.end_pattern()?;

        let Some(text) = self.scanner.capture_until(end) else {
            let first_line = self
                .scanner
                .rest()
                .split(|&b| b == b'\n')
                .next()
                .unwrap_or_default();
            Diagnostic::InvalidStringEntry {
                path: self.path.to_path_buf(),
                line,
                text: entry_text(first_line),
            }
            .report(sink);
            return None;
        };

        if let Some(name) = string_entry_name(&clean(text)) {
            return Some(Statement {
                kind: StatementKind::StringEntry,
                key: name.to_string(),
                text,
            });
        }

        Diagnostic::InvalidStringEntry {
            path: self.path.to_path_buf(),
            line,
            text: entry_text(text),
        }
        .report(sink);
        self.scanner.rewind_to(start);
        None
    }
}

impl DocumentSet {
    /// Parses `source`, the content of the file at `path`. The bytes need not
    /// be valid UTF-8; they are stored as they are.
    ///
    /// In [`ParseMode::Master`] the file gets its own document. In
    /// [`ParseMode::Update`] its string entries are merged into the documents
    /// already in the set and its structure is dropped.
    ///
    /// A statement that cannot be read at all stops the parse with
    /// [`Error::Structure`]; rows recorded up to that point stay in the set.
    /// Parsing also fails with [`Error::NoMasterDocuments`] if the set is
    /// still empty at the end.
    pub fn parse<P: AsRef<Path>, S: AsRef<[u8]> + ?Sized>(
        &mut self,
        path: P,
        source: &S,
        mode: ParseMode,
        options: &ParseOptions,
        sink: &mut Vec<Diagnostic>,
    ) -> Result<(), Error> {
        let path = path.as_ref();
        if mode.is_master() {
            self.get_or_insert(path);
        }

        let mut reader = StatementReader::new(path, source.as_ref(), options);
        while let Some(statement) = reader.next_statement(sink)? {
            self.record(path, mode, statement, sink);
        }

        if self.is_empty() {
            return Err(Error::NoMasterDocuments);
        }
        Ok(())
    }

    fn record(
        &mut self,
        path: &Path,
        mode: ParseMode,
        statement: Statement<'_>,
        sink: &mut Vec<Diagnostic>,
    ) {
        let Statement { kind, key, text } = statement;
        match mode {
            ParseMode::Master => {
                let doc = self.get_or_insert(path);
                doc.rows.push(key.clone());
                let rows = if kind.is_meta() {
                    &mut doc.meta
                } else {
                    &mut doc.data
                };
                if let Some(old) = rows.get(&key)
                    && old != text
                {
                    Diagnostic::DuplicateKey {
                        path: path.to_path_buf(),
                        key: key.clone(),
                        old: lossy(old).into_owned(),
                        new: lossy(text).into_owned(),
                    }
                    .report(sink);
                }
                rows.insert(key, text.to_vec());
            }
            ParseMode::Update if kind == StatementKind::StringEntry => {
                if !self.merge_entry(&key, text, sink).is_matched() {
                    Diagnostic::UnmatchedExtra {
                        path: path.to_path_buf(),
                        text: lossy(&clean(text)).into_owned(),
                    }
                    .report(sink);
                }
            }
            ParseMode::Update => {}
        }
    }
}
