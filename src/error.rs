use crate::debugger::BreakpointKind;
use std::error::Error as StdError;
use thiserror::Error;

/// How a failed step is routed to the caller's hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ErrorKind {
    /// The codebox reported a logical failure on purpose.
    RuntimeError,
    /// An accessor call or the codebox logic itself failed unexpectedly.
    CodeboxError,
}

/// Failure signaled by a codebox for its current step.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RunnerError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + 'static>>,
}

impl RunnerError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RuntimeError, message)
    }

    /// Wrap an unexpected fault, keeping its message and the fault itself as `source()`.
    pub fn codebox<E>(cause: E) -> Self
    where
        E: StdError + 'static,
    {
        Self {
            kind: ErrorKind::CodeboxError,
            message: cause.to_string(),
            source: Some(Box::new(cause)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<AccessError> for RunnerError {
    fn from(err: AccessError) -> Self {
        RunnerError::codebox(err)
    }
}

/// Failure of a `get_var` / `set_var` call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("{kind} breakpoint on `{name}` was abandoned before it was resumed")]
    Abandoned { kind: BreakpointKind, name: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DebuggerError {
    #[error("unknown breakpoint kind: {0}")]
    UnknownKind(String),
}
