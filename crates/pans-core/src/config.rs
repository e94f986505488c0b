use crate::error::ConfigError;
use crate::tool::DEFAULT_TOOL;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PAN_LIMIT: f64 = 1.0;
pub const DEFAULT_PAN_STEP: f64 = 0.1;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PansConfig {
    /// Program invoked for list/get/set calls.
    pub tool: PathBuf,
    /// Values are kept within `[-pan_limit, pan_limit]`.
    pub pan_limit: f64,
    /// Increment used by the interactive front end.
    pub pan_step: f64,
}

impl Default for PansConfig {
    fn default() -> Self {
        Self {
            tool: PathBuf::from(DEFAULT_TOOL),
            pan_limit: DEFAULT_PAN_LIMIT,
            pan_step: DEFAULT_PAN_STEP,
        }
    }
}

impl PansConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&config_path())
    }

    /// Applies command-line overrides on top of file values.
    pub fn with_overrides(
        mut self,
        tool: Option<PathBuf>,
        pan_limit: Option<f64>,
    ) -> Result<Self, ConfigError> {
        if let Some(tool) = tool {
            self.tool = tool;
        }
        if let Some(pan_limit) = pan_limit {
            self.pan_limit = pan_limit;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pan_limit.is_finite() && self.pan_limit > 0.0) {
            return Err(ConfigError::Invalid {
                field: "pan_limit",
                reason: format!("must be a positive number, got {}", self.pan_limit),
            });
        }
        if !(self.pan_step.is_finite() && self.pan_step > 0.0) {
            return Err(ConfigError::Invalid {
                field: "pan_step",
                reason: format!("must be a positive number, got {}", self.pan_step),
            });
        }
        if self.tool.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "tool",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = env::var("PANS_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    config_dir().join("pans/config.toml")
}

pub fn state_dir() -> PathBuf {
    if let Ok(path) = env::var("XDG_STATE_HOME") {
        return PathBuf::from(path);
    }
    home_dir().join(".local/state")
}

fn config_dir() -> PathBuf {
    if let Ok(path) = env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(path);
    }
    home_dir().join(".config")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
