use crate::error::ToolError;
use crate::parser::ProcessId;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

pub const DEFAULT_TOOL: &str = "pan";

/// One call into the external pan tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    /// `-P <pattern>`: list processes matching `pattern`.
    List { pattern: String },
    /// `-P <pattern> -i <id>`: query a single process.
    Get { pattern: String, id: ProcessId },
    /// `-P <pattern> -i <id> -p <value>`: apply a pan value.
    Set {
        pattern: String,
        id: ProcessId,
        value: f64,
    },
}

impl ToolRequest {
    pub fn list(pattern: impl Into<String>) -> Self {
        Self::List {
            pattern: pattern.into(),
        }
    }

    pub fn get(pattern: impl Into<String>, id: ProcessId) -> Self {
        Self::Get {
            pattern: pattern.into(),
            id,
        }
    }

    pub fn set(pattern: impl Into<String>, id: ProcessId, value: f64) -> Self {
        Self::Set {
            pattern: pattern.into(),
            id,
            value,
        }
    }

    pub fn pattern(&self) -> &str {
        match self {
            Self::List { pattern } | Self::Get { pattern, .. } | Self::Set { pattern, .. } => {
                pattern
            }
        }
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-P".to_string(), self.pattern().to_string()];
        match self {
            Self::List { .. } => {}
            Self::Get { id, .. } => {
                args.push("-i".to_string());
                args.push(id.to_string());
            }
            Self::Set { id, value, .. } => {
                args.push("-i".to_string());
                args.push(id.to_string());
                args.push("-p".to_string());
                args.push(format_value(*value));
            }
        }
        args
    }
}

/// Float rendering for `-p`: always carries a fractional part (`0.0`, `3.5`).
pub fn format_value(value: f64) -> String {
    // -0.0 would otherwise render with a sign
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:?}")
}

/// Seam between the controller and the external process. Calls block until the
/// tool exits.
pub trait PanTool {
    fn invoke(&mut self, request: &ToolRequest) -> Result<String, ToolError>;
}

#[derive(Debug, Clone)]
pub struct CommandTool {
    program: PathBuf,
}

impl CommandTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn render(&self, args: &[String]) -> String {
        let mut rendered = self.program.display().to_string();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

impl Default for CommandTool {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL)
    }
}

impl PanTool for CommandTool {
    fn invoke(&mut self, request: &ToolRequest) -> Result<String, ToolError> {
        let args = request.args();
        let command = self.render(&args);
        debug!(%command, "invoking pan tool");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| ToolError::Launch {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(command_failure(command, &output));
        }

        String::from_utf8(output.stdout).map_err(|_| ToolError::Decode { command })
    }
}

fn command_failure(command: String, output: &Output) -> ToolError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let detail = if !stderr.is_empty() {
        stderr
    } else if !stdout.is_empty() {
        stdout
    } else {
        "no output".to_string()
    };
    ToolError::Exit {
        command,
        status: output.status.to_string(),
        detail,
    }
}
