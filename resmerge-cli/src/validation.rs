use std::path::Path;

/// Validation context for a merge run
pub struct ValidationContext {
    pub inputs: Vec<String>,
    pub template: Option<String>,
    pub report_json: Option<String>,
    pub separator: String,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationContext {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            template: None,
            report_json: None,
            separator: resmerge::DEFAULT_SEPARATOR.to_string(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<String>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_template(mut self, template: String) -> Self {
        self.template = Some(template);
        self
    }

    pub fn with_report_json(mut self, path: String) -> Self {
        self.report_json = Some(path);
        self
    }

    pub fn with_separator(mut self, separator: String) -> Self {
        self.separator = separator;
        self
    }
}

/// Validate output directory exists or can be created
pub fn validate_output_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Output path cannot be empty".to_string());
    }

    let path_obj = Path::new(path);
    if path_obj.is_dir() {
        return Err(format!("Output path is a directory: {}", path));
    }

    if let Some(parent) = path_obj.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        return Err(format!("Cannot create output directory: {}", e));
    }

    Ok(())
}

/// Validate the output path template
pub fn validate_template(template: &str) -> Result<(), String> {
    resmerge::validate_template(template).map_err(|e| e.to_string())
}

/// Validate the token that separates master files from update files
pub fn validate_separator(separator: &str) -> Result<(), String> {
    if separator.is_empty() {
        return Err("Separator cannot be empty".to_string());
    }
    if separator == "-" {
        return Err("Separator cannot be '-', it reads input paths from stdin".to_string());
    }
    Ok(())
}

/// Validate the input list: at least one master before the separator
pub fn validate_inputs(inputs: &[String], separator: &str) -> Result<(), String> {
    if inputs.is_empty() {
        return Err("At least one input file or directory is required".to_string());
    }
    if inputs.len() == 1 && inputs[0] == "-" {
        return Ok(());
    }
    if inputs.first().is_some_and(|first| first == separator) {
        return Err(format!(
            "No master files before separator '{}'",
            separator
        ));
    }
    Ok(())
}

/// Validate a complete validation context
pub fn validate_context(context: &ValidationContext) -> Result<(), String> {
    validate_separator(&context.separator)
        .map_err(|e| format!("Separator validation failed: {}", e))?;

    validate_inputs(&context.inputs, &context.separator)
        .map_err(|e| format!("Input validation failed: {}", e))?;

    if let Some(ref template) = context.template {
        validate_template(template).map_err(|e| format!("Output validation failed: {}", e))?;
    }

    if let Some(ref report) = context.report_json {
        validate_output_path(report)
            .map_err(|e| format!("Report path validation failed: {}", e))?;
    }

    Ok(())
}
