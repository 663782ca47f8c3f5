//! Options for parsing, running and writing.

/// Default token that switches a run from master files to update files.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Role of the file being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Builds a document that later files are merged into.
    #[default]
    Master,
    /// Slave file: its `<string>` values are merged into the master documents.
    Update,
}

impl ParseMode {
    pub fn is_master(self) -> bool {
        self == ParseMode::Master
    }
}

/// What to do with a closing tag that does not match the innermost open block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockCloseMode {
    /// Keep the tag as a new open block.
    #[default]
    Lenient,
    /// Treat the file as malformed.
    Strict,
}

/// Parser behavior options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub block_close: BlockCloseMode,
}

impl ParseOptions {
    /// Creates default parse options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the closing tag handling.
    pub fn with_block_close(mut self, block_close: BlockCloseMode) -> Self {
        self.block_close = block_close;
        self
    }
}

/// Options for a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Input token that starts the update files.
    pub separator: String,
    /// Empty all master values when switching to update files, so every
    /// merged key counts as an update.
    pub reset_values: bool,
    pub parse: ParseOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            reset_values: false,
            parse: ParseOptions::default(),
        }
    }
}

impl SessionOptions {
    /// Creates default session options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn with_reset_values(mut self, reset_values: bool) -> Self {
        self.reset_values = reset_values;
        self
    }

    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }
}

/// Writer behavior options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriteOptions {
    /// Write documents even when nothing was updated.
    pub force: bool,
    /// Log every update and print a banner before documents sent to stdout.
    pub verbose: bool,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
