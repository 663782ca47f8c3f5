//! Input discovery: expands files and directories into the files to parse.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use resmerge::FileFilter;

/// Token that reads the input list from stdin.
pub const STDIN_INPUTS: &str = "-";

/// Files under `root` selected by `filter`, sorted by file name within each
/// directory. `root` may itself be a file. No ignore files are honored.
pub fn enumerate<P: AsRef<Path>>(root: P, filter: &FileFilter) -> Vec<PathBuf> {
    let walker = WalkBuilder::new(root.as_ref())
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for dent in walker {
        let dent = match dent {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("skipping {}: {}", root.as_ref().display(), e);
                continue;
            }
        };
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if filter.matches(dent.path()) {
            files.push(dent.into_path());
        } else {
            tracing::debug!("filtered out: {}", dent.path().display());
        }
    }
    files
}

/// Expands the command line inputs. A lone `-` is replaced by the lines read
/// from `stdin`; blank lines are dropped.
pub fn expand_inputs<R: BufRead>(inputs: &[String], stdin: R) -> Result<Vec<String>, String> {
    if inputs.len() != 1 || inputs[0] != STDIN_INPUTS {
        return Ok(inputs.to_vec());
    }

    let mut expanded = Vec::new();
    for line in stdin.lines() {
        let line = line.map_err(|e| format!("Failed to read inputs from stdin: {}", e))?;
        let line = line.trim_end_matches('\r');
        if !line.trim().is_empty() {
            expanded.push(line.to_string());
        }
    }
    Ok(expanded)
}
