use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with {status}: {detail}")]
    Exit {
        command: String,
        status: String,
        detail: String,
    },
    #[error("`{command}` produced non-UTF-8 output")]
    Decode { command: String },
}

impl ToolError {
    /// Rendered command line of the invocation that failed.
    pub fn command(&self) -> &str {
        match self {
            Self::Launch { command, .. }
            | Self::Exit { command, .. }
            | Self::Decode { command } => command,
        }
    }
}

/// Grammar violations in the tool's list output. Any of these aborts the whole
/// parse; callers never see a partial record list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: id token {token:?} does not start with '#'")]
    MissingIdMarker { line: usize, token: String },
    #[error("line {line}: id token {token:?} is not a decimal integer")]
    InvalidId { line: usize, token: String },
    #[error("line {line}: no quoted process name in {text:?}")]
    MissingName { line: usize, text: String },
    #[error("line {line}: process id {id} listed twice")]
    DuplicateId { line: usize, id: u32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum PanError {
    #[error("pan tool error: {0}")]
    Tool(#[from] ToolError),
    #[error("malformed process list: {0}")]
    Parse(#[from] ParseError),
    #[error("registry index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("pan value {0} is not a finite number")]
    InvalidValue(f64),
}
