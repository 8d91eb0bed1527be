use super::Runtime;
use crate::error::{AccessError, RunnerError};
use futures::channel::oneshot;
use serde_json::Value;
use tracing::debug;

pub type StepOutcome = Result<Value, RunnerError>;

/// Handle given to a codebox entry for exactly one step.
///
/// Carries the accessors and a one-shot completion signal. `resolve`,
/// `reject` and `settle` consume the step, so a step can only finish once
/// and a handle from an earlier step cannot finish a later one.
pub struct Step {
    index: usize,
    runtime: Runtime,
    signal: oneshot::Sender<StepOutcome>,
}

impl Step {
    pub(crate) fn new(index: usize, runtime: Runtime) -> (Self, oneshot::Receiver<StepOutcome>) {
        let (signal, outcome) = oneshot::channel();
        let step = Self {
            index,
            runtime,
            signal,
        };
        (step, outcome)
    }

    /// Position of this step in the runner's queue.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub async fn get_var(&self, comment: &str, name: &str) -> Result<Value, AccessError> {
        self.runtime.get_var(comment, name).await
    }

    pub async fn set_var(
        &self,
        comment: &str,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), AccessError> {
        self.runtime.set_var(comment, name, value).await
    }

    pub fn resolve(self, result: impl Into<Value>) {
        self.settle(Ok(result.into()));
    }

    pub fn reject(self, error: RunnerError) {
        self.settle(Err(error));
    }

    pub fn settle(self, outcome: StepOutcome) {
        let index = self.index;
        if self.signal.send(outcome).is_err() {
            debug!(step = index, "runner no longer waiting for this step");
        }
    }
}
