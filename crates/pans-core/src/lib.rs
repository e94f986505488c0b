pub mod config;
pub mod controller;
pub mod error;
pub mod parser;
pub mod registry;
pub mod tool;

pub use config::PansConfig;
pub use controller::PanController;
pub use error::{ConfigError, PanError, ParseError, ToolError};
pub use parser::{parse_process_list, ProcessId, ProcessRecord};
pub use registry::{Registry, RegistryEvent, TrackedProcess};
pub use tool::{CommandTool, PanTool, ToolRequest};
