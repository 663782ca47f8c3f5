//! Output path templates.
//!
//! A template is copied literally except for `%n`, replaced with the input
//! file name, and `%p`, replaced with the directory holding it. Any other
//! `%x` becomes `x`. The template `-` means standard output.

use std::path::{MAIN_SEPARATOR, Path};

use crate::error::Error;

/// Output template that sends documents to standard output.
pub const STDOUT_TEMPLATE: &str = "-";

fn separator_index(path: &str) -> Option<usize> {
    path.rfind(['/', MAIN_SEPARATOR])
}

/// File name part of `path`: everything after the last separator.
pub fn file_name(path: &str) -> &str {
    match separator_index(path) {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Directory part of `path`: everything before the last separator, or empty.
pub fn directory(path: &str) -> &str {
    match separator_index(path) {
        Some(index) => &path[..index],
        None => "",
    }
}

/// Builds the output path for `input` from `template`.
pub fn format_path<P: AsRef<Path>>(template: &str, input: P) -> String {
    let input = input.as_ref().to_string_lossy();
    let mut out = String::with_capacity(template.len() + input.len());
    let mut chars = template.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push_str(file_name(&input)),
            Some('p') => out.push_str(directory(&input)),
            Some(other) => out.push(other),
            None => out.push('%'),
        }
    }
    out
}

/// Checks that `template` names a file. An empty template is allowed and
/// means no output.
pub fn validate_template(template: &str) -> Result<(), Error> {
    if template.is_empty() || template == STDOUT_TEMPLATE {
        return Ok(());
    }
    if template.ends_with(['/', MAIN_SEPARATOR]) {
        return Err(Error::Template(format!(
            "`{}` names a directory, add %n for the file name",
            template
        )));
    }
    if file_name(template).is_empty() || file_name(template) == "%" {
        return Err(Error::Template(format!("`{}` has no file name", template)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_directory() {
        assert_eq!(file_name("res/values/strings.xml"), "strings.xml");
        assert_eq!(directory("res/values/strings.xml"), "res/values");
        assert_eq!(file_name("strings.xml"), "strings.xml");
        assert_eq!(directory("strings.xml"), "");
    }

    #[test]
    fn test_format_path_substitutions() {
        assert_eq!(
            format_path("%p-fr/%n", "res/values/strings.xml"),
            "res/values-fr/strings.xml"
        );
        assert_eq!(format_path("out/%n.new", "a/b.xml"), "out/b.xml.new");
        assert_eq!(format_path("%p/%n", "b.xml"), "/b.xml");
    }

    #[test]
    fn test_format_path_literals() {
        assert_eq!(format_path("-", "a/b.xml"), "-");
        assert_eq!(format_path("100%%", "a/b.xml"), "100%");
        assert_eq!(format_path("x%f", "a/b.xml"), "xf");
        assert_eq!(format_path("trailing%", "a/b.xml"), "trailing%");
    }

    #[test]
    fn test_validate_template() {
        assert!(validate_template("").is_ok());
        assert!(validate_template("-").is_ok());
        assert!(validate_template("%p-fr/%n").is_ok());
        assert!(validate_template("merged.xml").is_ok());
        assert!(matches!(validate_template("out/"), Err(Error::Template(_))));
        assert!(matches!(validate_template("out/%"), Err(Error::Template(_))));
    }
}
