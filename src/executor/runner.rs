use super::step::{Step, StepOutcome};
use super::Runtime;
use crate::codebox::Codebox;
use crate::debugger::Debugger;
use crate::error::{ErrorKind, RunnerError};
use futures::future::{self, Either};
use serde::Serialize;
use serde_json::Value;
use std::cell::Cell;
use tracing::{debug, info, warn};

type SuccessHook = Box<dyn Fn(Value)>;
type FailureHook = Box<dyn Fn(&RunnerError, &Codebox)>;

/// Where a runner is in its single pass over the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    NotStarted,
    Running { step: usize },
    Succeeded,
    Failed(ErrorKind),
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed(_))
    }
}

/// Runs codeboxes one after another against a shared variable store.
pub struct Runner {
    queue: Vec<Codebox>,
    runtime: Runtime,
    debugger: Debugger,
    state: Cell<RunState>,
    on_success: Option<SuccessHook>,
    on_runtime_error: Option<FailureHook>,
    on_codebox_error: Option<FailureHook>,
}

impl Runner {
    pub fn new() -> Self {
        let debugger = Debugger::new();
        Self {
            queue: Vec::new(),
            runtime: Runtime::new(debugger.clone()),
            debugger,
            state: Cell::new(RunState::NotStarted),
            on_success: None,
            on_runtime_error: None,
            on_codebox_error: None,
        }
    }

    /// Handle to this runner's debugger; keep a clone to operate it during a run.
    pub fn debugger(&self) -> Debugger {
        self.debugger.clone()
    }

    pub fn state(&self) -> RunState {
        self.state.get()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn add_codebox(&mut self, codebox: Codebox) {
        debug!(id = %codebox.id, position = self.queue.len(), "codebox added");
        self.queue.push(codebox);
    }

    /// Called with the last step's result once every codebox succeeded.
    pub fn on_success<F>(&mut self, hook: F)
    where
        F: Fn(Value) + 'static,
    {
        self.on_success = Some(Box::new(hook));
    }

    /// Called when a codebox rejects with `ErrorKind::RuntimeError`.
    pub fn on_runtime_error<F>(&mut self, hook: F)
    where
        F: Fn(&RunnerError, &Codebox) + 'static,
    {
        self.on_runtime_error = Some(Box::new(hook));
    }

    /// Called when a codebox rejects with `ErrorKind::CodeboxError`.
    pub fn on_codebox_error<F>(&mut self, hook: F)
    where
        F: Fn(&RunnerError, &Codebox) + 'static,
    {
        self.on_codebox_error = Some(Box::new(hook));
    }

    /// Execute the queue in order. Outcomes are delivered only through the hooks.
    ///
    /// A runner runs once; later calls are ignored.
    pub async fn run(&self, debug: bool) {
        if self.state.get() != RunState::NotStarted {
            warn!(state = ?self.state.get(), "runner already started; ignoring run");
            return;
        }

        self.runtime.set_debug(debug);
        let debug_enabled = debug;
        info!(debug = debug_enabled, codeboxes = self.queue.len(), "run started");

        let mut current = 0;
        let mut last = Value::Null;
        while current < self.queue.len() {
            self.state.set(RunState::Running { step: current });
            let codebox = &self.queue[current];

            match self.execute(current, codebox).await {
                Some(Ok(result)) => {
                    debug!(step = current, id = %codebox.id, "step finished");
                    last = result;
                    current += 1;
                }
                Some(Err(error)) => {
                    self.fail(error, codebox);
                    return;
                }
                None => {
                    warn!(
                        step = current,
                        id = %codebox.id,
                        "codebox dropped its step without finishing it; runner halted"
                    );
                    return;
                }
            }
        }

        self.state.set(RunState::Succeeded);
        info!(steps = self.queue.len(), "run succeeded");
        if let Some(hook) = &self.on_success {
            hook(last);
        }
    }

    /// Drive one codebox until its step is finished.
    ///
    /// Returns `None` if the step handle was dropped unfinished.
    async fn execute(&self, index: usize, codebox: &Codebox) -> Option<StepOutcome> {
        debug!(step = index, id = %codebox.id, description = %codebox.description, "step started");

        let (step, outcome) = Step::new(index, self.runtime.clone());
        let entry = codebox.start(step);

        // The step may finish before, during, or after the entry future completes.
        let outcome = match future::select(entry, outcome).await {
            Either::Left(((), outcome)) => outcome.await,
            Either::Right((outcome, _entry)) => outcome,
        };
        outcome.ok()
    }

    fn fail(&self, error: RunnerError, codebox: &Codebox) {
        let kind = error.kind();
        self.state.set(RunState::Failed(kind));
        warn!(id = %codebox.id, ?kind, %error, "run failed");

        let hook = match kind {
            ErrorKind::RuntimeError => &self.on_runtime_error,
            ErrorKind::CodeboxError => &self.on_codebox_error,
        };
        match hook {
            Some(hook) => hook(&error, codebox),
            None => debug!(?kind, "no hook registered; failure absorbed"),
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}
