//! Byte-level input and output of resource files.
//!
//! Files are scanned as raw bytes, so UTF-8, Latin-1 or a mix of both go
//! through untouched. Only UTF-16 files, recognized by their byte order mark,
//! are converted to UTF-8 for scanning and converted back when written.

use std::{fs, path::Path};

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};

use crate::error::Error;

/// The bytes to scan and the encoding of the file they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub bytes: Vec<u8>,
    pub encoding: &'static Encoding,
}

impl SourceText {
    /// Bytes that are scanned as they are.
    pub fn raw(bytes: Vec<u8>) -> Self {
        SourceText {
            bytes,
            encoding: UTF_8,
        }
    }
}

/// Prepares file content for scanning.
///
/// UTF-16 with a byte order mark is converted to UTF-8 without the mark.
/// Anything else is kept byte for byte, UTF-8 BOM included.
pub fn decode(bytes: Vec<u8>) -> Result<SourceText, Error> {
    match Encoding::for_bom(&bytes) {
        Some((encoding, bom_len)) if encoding != UTF_8 => {
            let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
            if had_errors {
                return Err(Error::InvalidEncoding(format!(
                    "malformed {} input",
                    encoding.name()
                )));
            }
            Ok(SourceText {
                bytes: text.into_owned().into_bytes(),
                encoding,
            })
        }
        _ => Ok(SourceText::raw(bytes)),
    }
}

/// Converts scanned bytes back to `encoding`. UTF-16 output starts with a
/// byte order mark; any other encoding gets the bytes unchanged.
pub fn encode(bytes: &[u8], encoding: &'static Encoding) -> Vec<u8> {
    let big_endian = if encoding == UTF_16LE {
        false
    } else if encoding == UTF_16BE {
        true
    } else {
        return bytes.to_vec();
    };

    let text = String::from_utf8_lossy(bytes);
    let mut out = Vec::with_capacity(2 * (text.len() + 1));
    for unit in std::iter::once(0xFEFF).chain(text.encode_utf16()) {
        let pair = if big_endian {
            unit.to_be_bytes()
        } else {
            unit.to_le_bytes()
        };
        out.extend_from_slice(&pair);
    }
    out
}

/// Reads and decodes a whole file.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<SourceText, Error> {
    let bytes = fs::read(path)?;
    decode(bytes)
}
