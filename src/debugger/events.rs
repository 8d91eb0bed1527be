use crate::error::DebuggerError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Which accessor raised a breakpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BreakpointKind {
    GetVar,
    SetVar,
}

impl BreakpointKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakpointKind::GetVar => "GetVar",
            BreakpointKind::SetVar => "SetVar",
        }
    }
}

impl fmt::Display for BreakpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakpointKind {
    type Err = DebuggerError;

    /// Accepts `GetVar`/`SetVar` (any case) and the short forms `get`/`set`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "getvar" | "get-var" | "get" => Ok(BreakpointKind::GetVar),
            "setvar" | "set-var" | "set" => Ok(BreakpointKind::SetVar),
            _ => Err(DebuggerError::UnknownKind(s.to_string())),
        }
    }
}

/// Payload handed to notification callbacks when a watched access is suspended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakpointEvent {
    pub comment: String,
    pub name: String,
}
