mod runner;
mod runtime;
mod step;

pub use runner::{RunState, Runner};
pub use runtime::Runtime;
pub use step::{Step, StepOutcome};
