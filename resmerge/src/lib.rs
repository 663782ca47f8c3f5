#![forbid(unsafe_code)]
//! Merge translated values into Android `strings.xml` files.
//!
//! Master files are parsed into documents that remember every statement in
//! order: the XML declaration, comments, blocks, free text and each
//! `<string>` entry. Update files are parsed afterwards and their `<string>`
//! entries replace the master entries with the same `name`. Writing a
//! document back gives the master file byte for byte, with only the merged
//! entries changed.
//!
//! This is not an XML parser. It reads the line-oriented subset of XML that
//! string resource files use.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use resmerge::{MergeSession, SessionOptions, WriteOptions};
//!
//! let mut session = MergeSession::new(SessionOptions::new());
//! session.process_input("res/values/strings.xml")?;
//! session.process_input(",")?;
//! session.process_input("translations/fr.xml")?;
//!
//! let results = session.write_outputs("%p-fr/%n", &WriteOptions::new(), &mut std::io::stdout());
//! println!("{} updates", session.summary().updates);
//! # let _ = results;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod diagnostic;
pub mod document;
pub mod encoding;
pub mod error;
pub mod filter;
pub mod merge;
pub mod options;
pub mod parser;
pub mod path_format;
pub mod scanner;
pub mod session;
pub mod writer;

// Re-export most used types for easy consumption
pub use crate::{
    diagnostic::Diagnostic,
    document::{Document, DocumentSet},
    encoding::{SourceText, decode, encode, load_file},
    error::Error,
    filter::{FileFilter, PatternKind},
    merge::{MergeOutcome, equal_ignore_whitespace},
    options::{BlockCloseMode, DEFAULT_SEPARATOR, ParseMode, ParseOptions, SessionOptions, WriteOptions},
    path_format::{format_path, validate_template},
    scanner::{Statement, StatementKind},
    session::{FileReport, InputOutcome, MergeSession, RunReport, RunSummary},
    writer::{WriteOutcome, WriteResult, write_documents},
};
