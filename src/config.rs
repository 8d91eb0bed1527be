use crate::debugger::BreakpointKind;
use crate::error::DebuggerError;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Debug session settings, read from a JSON file and overridden by CLI flags.
///
/// ```json
/// { "debug": true, "watch": ["str_a"], "notify": ["GetVar"], "auto_continue_ms": 5000 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub debug: bool,
    pub watch: Vec<String>,
    pub notify: Vec<String>,
    /// Resume one breakpoint every this many milliseconds, standing in for an operator.
    pub auto_continue_ms: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Kind(#[from] DebuggerError),
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Breakpoint kinds named in `notify`, deduplicated in first-seen order.
    pub fn notify_kinds(&self) -> Result<Vec<BreakpointKind>, ConfigError> {
        let mut kinds = Vec::new();
        for raw in &self.notify {
            let kind: BreakpointKind = raw.parse()?;
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        Ok(kinds)
    }
}
