//! Propagation of update-file values into master documents.

use crate::{diagnostic::Diagnostic, document::DocumentSet};

/// Result of merging one entry from an update file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The first document holding the key got a different value.
    Updated,
    /// The first document holding the key already had the same value.
    Unchanged,
    /// No document holds the key.
    Unmatched,
}

impl MergeOutcome {
    pub fn is_matched(self) -> bool {
        self != MergeOutcome::Unmatched
    }
}

/// Compares two statements, skipping every whitespace character.
///
/// Space, tab, CR, LF, form feed and vertical tab are all skipped alike,
/// including inside attribute values.
pub fn equal_ignore_whitespace(a: &[u8], b: &[u8]) -> bool {
    fn is_space(b: &&u8) -> bool {
        matches!(**b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
    }
    a.iter().filter(|b| !is_space(b)).eq(b.iter().filter(|b| !is_space(b)))
}

impl DocumentSet {
    /// Merges `text`, the `<string>` statement named `key`, into the documents.
    ///
    /// The first document (in parse order) that holds `key` takes the new
    /// text. Its old text goes into `updates` unless the two only differ in
    /// whitespace. Later documents holding the key are left alone and only
    /// reported when their text differs. Every document without the key
    /// records the text in `extra`.
    pub fn merge_entry(
        &mut self,
        key: &str,
        text: &[u8],
        sink: &mut Vec<Diagnostic>,
    ) -> MergeOutcome {
        let mut outcome = MergeOutcome::Unmatched;

        for doc in self.iter_mut() {
            let Some(current) = doc.data.get_mut(key) else {
                doc.extra.insert(key.to_string(), text.to_vec());
                continue;
            };

            if outcome.is_matched() {
                if current.as_slice() != text {
                    Diagnostic::CrossDocumentDuplicate {
                        path: doc.path.clone(),
                        key: key.to_string(),
                    }
                    .report(sink);
                }
                continue;
            }

            if current.is_empty() || !equal_ignore_whitespace(current, text) {
                let previous = std::mem::replace(current, text.to_vec());
                doc.updates.insert(key.to_string(), previous);
                outcome = MergeOutcome::Updated;
            } else {
                *current = text.to_vec();
                outcome = MergeOutcome::Unchanged;
            }
        }

        outcome
    }
}
