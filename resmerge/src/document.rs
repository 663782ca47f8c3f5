//! Row model for parsed string-resource files.
//!
//! A [`Document`] keeps the order of every statement in `rows` and their text
//! in two maps: `meta` for structure (declarations, comments, blocks, free
//! text) and `data` for `<string>` entries. Writing the rows back in order
//! reproduces the file, with merged values in place of the originals.
//! Row text is kept as raw bytes, so files that are not valid UTF-8 come back
//! unchanged.

use std::{
    collections::{BTreeMap, HashMap},
    io::Write,
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};

use crate::{
    encoding::encode,
    error::Error,
    scanner::{is_meta_key, lossy, string_entry_value},
};

/// Key to statement bytes.
pub type RowMap = HashMap<String, Vec<u8>>;

/// One master file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    /// Keys in file order.
    pub rows: Vec<String>,
    /// Structural rows.
    pub meta: RowMap,
    /// `<string>` rows keyed by their `name` attribute.
    pub data: RowMap,
    /// Previous text of every data row changed by an update file.
    pub updates: BTreeMap<String, Vec<u8>>,
    /// Entries supplied by update files that this document does not hold.
    pub extra: BTreeMap<String, Vec<u8>>,
    /// Encoding the file is written back in.
    pub encoding: &'static Encoding,
}

impl Default for Document {
    fn default() -> Self {
        Document {
            path: PathBuf::new(),
            rows: Vec::new(),
            meta: RowMap::new(),
            data: RowMap::new(),
            updates: BTreeMap::new(),
            extra: BTreeMap::new(),
            encoding: UTF_8,
        }
    }
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Document {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Bytes of the row with `key`, looked up in `meta` or `data` by key prefix.
    pub fn row_text(&self, key: &str) -> Option<&[u8]> {
        if is_meta_key(key) {
            self.meta.get(key).map(Vec::as_slice)
        } else {
            self.data.get(key).map(Vec::as_slice)
        }
    }

    /// Inner text of the `<string>` entry named `key`, if it is valid UTF-8.
    pub fn string_value(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(|text| string_entry_value(text))
            .and_then(|value| std::str::from_utf8(value).ok())
    }

    /// Whether an update file changed anything in this document.
    pub fn has_updates(&self) -> bool {
        !self.updates.is_empty()
    }

    /// Replays the rows into `writer`, in the document's encoding.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        if self.encoding == UTF_8 {
            for key in &self.rows {
                if let Some(text) = self.row_text(key) {
                    writer.write_all(text)?;
                }
            }
        } else {
            writer.write_all(&encode(&self.to_bytes(), self.encoding))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Replays the rows into a buffer, without re-encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.rows
            .iter()
            .filter_map(|key| self.row_text(key))
            .flatten()
            .copied()
            .collect()
    }

    /// Replays the rows into a string, replacing invalid UTF-8.
    pub fn render(&self) -> String {
        lossy(&self.to_bytes()).into_owned()
    }
}

/// Every document parsed in a run, in parse order.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    documents: Vec<Document>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Document> {
        self.documents.iter_mut()
    }

    pub fn get<P: AsRef<Path>>(&self, path: P) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.path == path.as_ref())
    }

    pub fn get_mut<P: AsRef<Path>>(&mut self, path: P) -> Option<&mut Document> {
        self.documents
            .iter_mut()
            .find(|doc| doc.path == path.as_ref())
    }

    /// Returns the document for `path`, adding an empty one at the end if needed.
    pub fn get_or_insert<P: AsRef<Path>>(&mut self, path: P) -> &mut Document {
        let path = path.as_ref();
        let index = match self.documents.iter().position(|doc| doc.path == path) {
            Some(index) => index,
            None => {
                self.documents.push(Document::new(path));
                self.documents.len() - 1
            }
        };
        &mut self.documents[index]
    }

    /// Total number of updated keys over all documents.
    pub fn update_count(&self) -> usize {
        self.documents.iter().map(|doc| doc.updates.len()).sum()
    }

    /// Total number of extra keys over all documents.
    pub fn extra_count(&self) -> usize {
        self.documents.iter().map(|doc| doc.extra.len()).sum()
    }

    /// Empties every data value, so that the next merge marks each matched key as updated.
    pub fn clear_data_values(&mut self) {
        for doc in &mut self.documents {
            for value in doc.data.values_mut() {
                value.clear();
            }
        }
    }
}

impl<'a> IntoIterator for &'a DocumentSet {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}
