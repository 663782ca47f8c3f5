//! Lexical scanning of string-resource files.
//!
//! The scanner does not understand XML. It finds the next `<` that starts a
//! statement and captures text up to a terminator pattern taken from a fixed
//! table, one terminator per [`StatementKind`]. Every terminator also swallows
//! the blanks and line breaks that follow it, so concatenating all captured
//! statements (plus the free text between them) gives back the input.
//!
//! Input is scanned as bytes. Text that is not valid UTF-8 passes through
//! unchanged; only diagnostics decode it, lossily.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::bytes::Regex;

/// Prefix of the synthetic keys given to structural rows.
pub const META_PREFIX: &str = "_#";

lazy_static! {
    /// `<` followed by any character.
    static ref TAG_START: Regex = Regex::new(r"(?s-u)<.").unwrap();
    static ref DECLARATION_END: Regex = Regex::new(r"(?-u)\?>[ \r\n]*").unwrap();
    static ref COMMENT_END: Regex = Regex::new(r"(?-u)-->[ \r\n]*").unwrap();
    static ref STRING_END: Regex = Regex::new(r"(?-u)</string>[ \r\n]*").unwrap();
    static ref BLOCK_END: Regex = Regex::new(r"(?-u)<[^<]+>[ \r\n]*").unwrap();
    /// Validates a captured `<string ...>...</string>` statement with line breaks removed.
    static ref STRING_ENTRY: Regex = Regex::new(
        r#"(?s-u)^<string\b[^>]*?\sname=["']([^"']+)["'][^>]*>.*</string>[ \r\n]*$"#
    )
    .unwrap();
}

/// Classification of a scanned statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// `<?xml ... ?>`
    Declaration,
    /// `<!-- ... -->`
    Comment,
    /// Any other tag, e.g. `<resources>`.
    BlockOpen,
    /// `</name>` matching the innermost open block.
    BlockClose,
    /// `<string name="key">value</string>`
    StringEntry,
    /// Text between statements.
    FreeText,
}

impl StatementKind {
    /// Kinds selected by a literal trigger, in lookup order.
    pub const TRIGGERED: [StatementKind; 4] = [
        StatementKind::Declaration,
        StatementKind::Comment,
        StatementKind::BlockClose,
        StatementKind::StringEntry,
    ];

    /// Literal text that selects this kind. `BlockOpen` is the fallback and
    /// `FreeText` is never triggered by a tag.
    pub fn trigger(self) -> Option<&'static str> {
        match self {
            StatementKind::Declaration => Some("<?"),
            StatementKind::Comment => Some("<!"),
            StatementKind::BlockClose => Some("</"),
            StatementKind::StringEntry => Some("<string "),
            StatementKind::BlockOpen | StatementKind::FreeText => None,
        }
    }

    /// Terminator pattern for the statement, including trailing blanks.
    pub fn end_pattern(self) -> Option<&'static Regex> {
        match self {
            StatementKind::Declaration => Some(&DECLARATION_END),
            StatementKind::Comment => Some(&COMMENT_END),
            StatementKind::StringEntry => Some(&STRING_END),
            StatementKind::BlockOpen | StatementKind::BlockClose => Some(&BLOCK_END),
            StatementKind::FreeText => None,
        }
    }

    /// Whether rows of this kind are stored as structure rather than data.
    pub fn is_meta(self) -> bool {
        self != StatementKind::StringEntry
    }
}

/// A classified span of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement<'a> {
    pub kind: StatementKind,
    /// Synthetic `_#<n>` key, or the `name` attribute of a string entry.
    pub key: String,
    /// Verbatim input bytes, trailing whitespace included.
    pub text: &'a [u8],
}

/// Pattern that finds the start of the next tag.
pub fn tag_start() -> &'static Regex {
    &TAG_START
}

/// Returns the synthetic key for row number `n`.
pub fn meta_key(n: usize) -> String {
    format!("{}{}", META_PREFIX, n)
}

/// Whether `key` is a synthetic structural key.
pub fn is_meta_key(key: &str) -> bool {
    key.starts_with(META_PREFIX)
}

/// Removes embedded line feeds.
pub fn clean(text: &[u8]) -> Vec<u8> {
    text.iter().copied().filter(|&b| b != b'\n').collect()
}

/// Decodes `text` for display, replacing invalid sequences.
pub fn lossy(text: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(text)
}

/// One-line rendition of a statement for diagnostics.
pub fn entry_text(text: &[u8]) -> String {
    lossy(&clean(text)).trim_end().to_string()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Extracts the `name` attribute of a string entry, if `cleaned` is one.
///
/// Names using the synthetic key prefix are rejected since the writer could
/// not tell them apart from structural rows. So are captures that run into a
/// second `<string ` entry, which happens when the first one is not closed.
/// Names must be valid UTF-8 since they become map keys.
pub fn string_entry_name(cleaned: &[u8]) -> Option<&str> {
    if cleaned.get(1..).is_some_and(|body| contains(body, b"<string ")) {
        return None;
    }
    let caps = STRING_ENTRY.captures(cleaned)?;
    let name = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?;
    if is_meta_key(name) { None } else { Some(name) }
}

/// Returns the bytes between the opening tag's `>` and `</string>`.
pub fn string_entry_value(text: &[u8]) -> Option<&[u8]> {
    const CLOSE: &[u8] = b"</string>";
    let open_end = text.iter().position(|&b| b == b'>')? + 1;
    let close = text.windows(CLOSE.len()).rposition(|w| w == CLOSE)?;
    if close < open_end {
        return None;
    }
    Some(&text[open_end..close])
}

/// Cursor over the bytes of one input file.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a [u8]) -> Self {
        Scanner { source, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Moves the cursor back to an earlier statement start.
    pub fn rewind_to(&mut self, pos: usize) {
        debug_assert!(pos <= self.source.len());
        self.pos = pos;
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// Bytes from `from` up to the cursor.
    pub fn since(&self, from: usize) -> &'a [u8] {
        &self.source[from..self.pos]
    }

    /// Bytes from the cursor to the end of input.
    pub fn rest(&self) -> &'a [u8] {
        &self.source[self.pos..]
    }

    /// Searches forward for `start`.
    ///
    /// Returns the distance from the cursor to the match and the distance to
    /// the end of the match. The cursor moves to the start of the match only,
    /// so the caller can look at the matched text.
    pub fn find_next(&mut self, start: &Regex) -> Option<(usize, usize)> {
        let m = start.find_at(self.source, self.pos)?;
        let offset = m.start() - self.pos;
        self.pos = m.start();
        Some((offset, offset + m.len()))
    }

    /// Captures from the cursor through the end of the next `end` match.
    ///
    /// On failure the cursor does not move.
    pub fn capture_until(&mut self, end: &Regex) -> Option<&'a [u8]> {
        let m = end.find_at(self.source, self.pos)?;
        let text = &self.source[self.pos..m.end()];
        self.pos = m.end();
        Some(text)
    }

    /// Whether the text at the cursor starts with `prefix`.
    pub fn looking_at(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix.as_bytes())
    }

    /// Kind selected by the trigger at the cursor. `None` means the tag is
    /// taken as a block opening.
    pub fn classify(&self) -> Option<StatementKind> {
        StatementKind::TRIGGERED
            .into_iter()
            .find(|kind| kind.trigger().is_some_and(|t| self.looking_at(t)))
    }

    /// Zero-based line index of `pos`, i.e. the number of `\n` before it.
    pub fn line_at(&self, pos: usize) -> usize {
        let end = pos.min(self.source.len());
        self.source[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
    }

    /// The next `n` characters from the cursor.
    pub fn excerpt(&self, n: usize) -> String {
        let rest = self.rest();
        let head = &rest[..rest.len().min(4 * n)];
        lossy(head).chars().take(n).collect()
    }
}
