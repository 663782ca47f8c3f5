//! CLI library for testing purposes

pub mod discover;
pub mod logging;
pub mod run;
pub mod validation;

pub use discover::{enumerate, expand_inputs};
pub use run::{MergeOptions, format_file_report, run_merge_command};
