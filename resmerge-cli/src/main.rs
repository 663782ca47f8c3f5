use clap::Parser;
use resmerge_cli::{MergeOptions, logging, run_merge_command};

/// Merge translated strings.xml values into master resource files.
///
/// Inputs before the separator are master files; inputs after it are update
/// files whose `<string>` values replace the master values with the same name.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Master files or directories, the separator, then update files or directories.
    /// A single `-` reads the list from stdin, one path per line.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output path template: %n is the master file name, %p its directory,
    /// `-` writes to stdout. Nothing is written when omitted.
    #[arg(short, long, default_value = "")]
    out: String,

    /// Only parse files whose name matches (`*` is any text). Can be repeated.
    #[arg(long = "file-include", value_name = "PATTERN")]
    file_include: Vec<String>,

    /// Skip files whose name matches. Can be repeated.
    #[arg(long = "file-exclude", value_name = "PATTERN")]
    file_exclude: Vec<String>,

    /// Only parse files whose directory matches. Can be repeated.
    #[arg(long = "path-include", value_name = "PATTERN")]
    path_include: Vec<String>,

    /// Skip files whose directory matches. Can be repeated.
    #[arg(long = "path-exclude", value_name = "PATTERN")]
    path_exclude: Vec<String>,

    /// Input token that starts the update files
    #[arg(long, default_value = resmerge::DEFAULT_SEPARATOR, allow_hyphen_values = true)]
    separator: String,

    /// Print row counts for every parsed file
    #[arg(long)]
    show_input: bool,

    /// Log each update and enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Fail a file whose closing tag does not match the open block
    #[arg(long)]
    strict_close: bool,

    /// Empty master values before merging so every merged key is written
    #[arg(long)]
    reset_values: bool,

    /// Write documents even when nothing was updated
    #[arg(long)]
    force: bool,

    /// Write a JSON report of the run
    #[arg(long, value_name = "PATH")]
    report_json: Option<String>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init(args.verbose) {
        eprintln!("Error: failed to initialize logging: {}", e);
    }

    let opts = MergeOptions {
        inputs: args.inputs,
        out: args.out,
        file_include: args.file_include,
        file_exclude: args.file_exclude,
        path_include: args.path_include,
        path_exclude: args.path_exclude,
        separator: args.separator,
        show_input: args.show_input,
        verbose: args.verbose,
        strict_close: args.strict_close,
        reset_values: args.reset_values,
        force: args.force,
        report_json: args.report_json,
    };

    match run_merge_command(opts, std::io::stdin().lock()) {
        // already reported in the summary
        Ok(summary) if summary.pattern_errors > 0 => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
