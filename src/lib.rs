//! Sequential codebox runner with a variable-watching debugger.
//!
//! A [`Runner`] executes its [`Codebox`]es in order. Codeboxes share one
//! variable store and reach it only through the accessors on their [`Step`].
//! In debug mode, an access to a name on the [`Debugger`]'s watch list is
//! suspended until an operator calls [`Debugger::resume`]; suspended accesses
//! resume strictly in arrival order.

pub mod codebox;
pub mod config;
pub mod debugger;
pub mod error;
pub mod executor;
pub mod logging;

pub use codebox::Codebox;
pub use debugger::{BreakpointEvent, BreakpointKind, Debugger};
pub use error::{AccessError, DebuggerError, ErrorKind, RunnerError};
pub use executor::{RunState, Runner, Runtime, Step, StepOutcome};
