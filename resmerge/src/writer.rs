//! Writes merged documents back out.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    document::{Document, DocumentSet},
    error::Error,
    options::WriteOptions,
    path_format::{STDOUT_TEMPLATE, format_path},
    scanner::entry_text,
};

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// Written to the output file.
    Written,
    /// Written to standard output.
    Stdout,
    /// Skipped because no value changed.
    NoUpdates,
    /// The output could not be written.
    Failed { error: String },
}

/// Per-document result of [`write_documents`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    pub source: PathBuf,
    pub output: String,
    pub updates: usize,
    #[serde(flatten)]
    pub outcome: WriteOutcome,
}

fn write_file(doc: &Document, output: &str) -> Result<(), Error> {
    let path = Path::new(output);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    doc.write_to(BufWriter::new(file))
}

fn log_updates(doc: &Document) {
    for (key, old) in &doc.updates {
        let new = doc.data.get(key).map(Vec::as_slice).unwrap_or_default();
        tracing::info!(
            "update: [{}]={} to: {}",
            key,
            entry_text(old),
            entry_text(new)
        );
    }
}

/// Writes every document of `set` to the path built from `template`.
///
/// Documents without updates are skipped unless `options.force` is set or the
/// output is `-`, which goes to `stdout`. An empty template writes nothing.
/// A document that cannot be written is reported in its result and the
/// others are still written.
pub fn write_documents<W: Write>(
    set: &DocumentSet,
    template: &str,
    options: &WriteOptions,
    stdout: &mut W,
) -> Vec<WriteResult> {
    if template.is_empty() {
        return Vec::new();
    }

    let mut results = Vec::with_capacity(set.len());
    for doc in set {
        let output = format_path(template, &doc.path);
        let to_stdout = output == STDOUT_TEMPLATE;

        let outcome = if !to_stdout && !doc.has_updates() && !options.force {
            tracing::info!("no updates to: {}", output);
            WriteOutcome::NoUpdates
        } else {
            if options.verbose {
                log_updates(doc);
            }
            let written = if to_stdout {
                let banner = if options.verbose {
                    write!(stdout, "\n==== File: {}\n", doc.path.display()).map_err(Error::from)
                } else {
                    Ok(())
                };
                banner.and_then(|()| doc.write_to(&mut *stdout))
            } else {
                write_file(doc, &output)
            };

            match written {
                Ok(()) if to_stdout => WriteOutcome::Stdout,
                Ok(()) => {
                    tracing::info!("saved {} updates to: {}", doc.updates.len(), output);
                    WriteOutcome::Written
                }
                Err(e) => {
                    tracing::error!(
                        "failed creation of: {} from {}: {}",
                        output,
                        doc.path.display(),
                        e
                    );
                    WriteOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            }
        };

        results.push(WriteResult {
            source: doc.path.clone(),
            output,
            updates: doc.updates.len(),
            outcome,
        });
    }
    results
}
