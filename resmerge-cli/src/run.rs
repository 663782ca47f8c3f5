use std::io::{BufRead, Write};
use std::path::Path;

use resmerge::{
    BlockCloseMode, FileFilter, FileReport, InputOutcome, MergeSession, ParseOptions, PatternKind,
    RunSummary, SessionOptions, WriteOptions, WriteOutcome, WriteResult,
};

use crate::discover::{enumerate, expand_inputs};
use crate::validation::{ValidationContext, validate_context};

/// Options of one merge run, as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub inputs: Vec<String>,
    pub out: String,
    pub file_include: Vec<String>,
    pub file_exclude: Vec<String>,
    pub path_include: Vec<String>,
    pub path_exclude: Vec<String>,
    pub separator: String,
    pub show_input: bool,
    pub verbose: bool,
    pub strict_close: bool,
    pub reset_values: bool,
    pub force: bool,
    pub report_json: Option<String>,
}

/// Compiles the filter patterns. A bad pattern is logged and counted by the
/// filter, which then selects no files.
fn build_filter(opts: &MergeOptions) -> FileFilter {
    let lists = [
        (PatternKind::IncludeFile, &opts.file_include),
        (PatternKind::ExcludeFile, &opts.file_exclude),
        (PatternKind::IncludePath, &opts.path_include),
        (PatternKind::ExcludePath, &opts.path_exclude),
    ];

    let mut filter = FileFilter::new();
    for (kind, patterns) in lists {
        for pattern in patterns {
            if let Err(e) = filter.add(kind, pattern) {
                tracing::error!("{}", e);
            }
        }
    }
    filter
}

fn session_options(opts: &MergeOptions) -> SessionOptions {
    let block_close = if opts.strict_close {
        BlockCloseMode::Strict
    } else {
        BlockCloseMode::Lenient
    };
    SessionOptions::new()
        .with_separator(opts.separator.clone())
        .with_reset_values(opts.reset_values)
        .with_parse_options(ParseOptions::new().with_block_close(block_close))
}

/// Line printed by `--show-input` for a parsed file.
pub fn format_file_report(report: &FileReport) -> String {
    if report.master {
        format!(
            "Parsed: {} rows={} data={} meta={}",
            report.path.display(),
            report.rows,
            report.data,
            report.meta
        )
    } else {
        format!(
            "Parsed: {} updates={} extras={}",
            report.path.display(),
            report.updates,
            report.extras
        )
    }
}

fn process(session: &mut MergeSession, path: &Path, show_input: bool) {
    match session.process_input(path) {
        Ok(InputOutcome::Parsed(report)) if show_input => {
            println!("{}", format_file_report(&report));
        }
        Ok(_) => {}
        // already logged and counted by the session
        Err(_) => {}
    }
}

fn write_report(
    path: &str,
    session: &MergeSession,
    results: &[WriteResult],
) -> Result<(), String> {
    let text = session
        .report(results)
        .to_json()
        .map_err(|e| format!("Failed to serialize report JSON: {}", e))?;
    std::fs::write(path, text).map_err(|e| format!("Failed to write report JSON '{}': {}", path, e))
}

fn summary_lines(summary: &RunSummary, results: &[WriteResult]) -> Vec<String> {
    let mut lines = Vec::new();
    for result in results {
        match &result.outcome {
            WriteOutcome::Written => lines.push(format!(
                "✅ Written: {} ({} updates)",
                result.output, result.updates
            )),
            WriteOutcome::Failed { error } => {
                lines.push(format!("❌ Failed: {}: {}", result.output, error))
            }
            WriteOutcome::Stdout | WriteOutcome::NoUpdates => {}
        }
    }

    lines.push(format!(
        "Files parsed: {}, documents: {}, updates: {}, extras: {}, warnings: {}",
        summary.parsed_files,
        summary.documents,
        summary.updates,
        summary.extras,
        summary.warnings
    ));
    if summary.has_errors() {
        lines.push(format!(
            "Errors: parse={} io={} pattern={}",
            summary.failed_files, summary.io_errors, summary.pattern_errors
        ));
    }
    lines
}

/// Run the merge: parse masters, then update files, then write the results.
///
/// Only option and validation problems are returned as errors. Files that
/// cannot be read or parsed and filter patterns that do not compile are
/// counted in the returned summary.
pub fn run_merge_command<R: BufRead>(opts: MergeOptions, stdin: R) -> Result<RunSummary, String> {
    let inputs = expand_inputs(&opts.inputs, stdin)?;

    let mut context = ValidationContext::new()
        .with_inputs(inputs.clone())
        .with_template(opts.out.clone())
        .with_separator(opts.separator.clone());
    if let Some(report) = &opts.report_json {
        context = context.with_report_json(report.clone());
    }
    validate_context(&context)?;

    let filter = build_filter(&opts);
    let mut session = MergeSession::new(session_options(&opts));
    session.add_pattern_errors(filter.pattern_errors());

    for input in &inputs {
        if session.is_separator(input) {
            process(&mut session, Path::new(input), opts.show_input);
            continue;
        }

        let root = Path::new(input);
        if !root.exists() {
            // let the session count the missing input
            process(&mut session, root, opts.show_input);
            continue;
        }
        for file in enumerate(root, &filter) {
            process(&mut session, &file, opts.show_input);
        }
    }

    if !opts.out.is_empty()
        && opts.out != resmerge::path_format::STDOUT_TEMPLATE
        && !opts.out.contains("%n")
        && session.documents().len() > 1
    {
        tracing::warn!(
            "output template '{}' has no %n, documents will overwrite each other",
            opts.out
        );
    }

    let write_options = WriteOptions::new()
        .with_force(opts.force)
        .with_verbose(opts.verbose);
    let results = {
        let mut stdout = std::io::stdout().lock();
        let results = session.write_outputs(&opts.out, &write_options, &mut stdout);
        if let Err(e) = stdout.flush() {
            tracing::error!("failed to flush stdout: {}", e);
        }
        results
    };

    let summary = session.summary();
    let to_stderr = opts.out == resmerge::path_format::STDOUT_TEMPLATE;
    for line in summary_lines(&summary, &results) {
        if to_stderr {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    if let Some(report_path) = &opts.report_json {
        write_report(report_path, &session, &results)?;
        if to_stderr {
            eprintln!("Report JSON written: {}", report_path);
        } else {
            println!("Report JSON written: {}", report_path);
        }
    }

    Ok(summary)
}
