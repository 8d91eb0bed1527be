use super::BreakpointKind;
use futures::channel::oneshot;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;

/// Deferred read or write against the variable store.
pub type BreakpointAction = Box<dyn FnOnce() -> Value>;

/// One suspended variable access.
pub struct Breakpoint {
    pub kind: BreakpointKind,
    pub comment: String,
    pub name: String,
    action: BreakpointAction,
    resolve: oneshot::Sender<Value>,
}

impl Breakpoint {
    pub fn new(
        kind: BreakpointKind,
        comment: String,
        name: String,
        action: BreakpointAction,
        resolve: oneshot::Sender<Value>,
    ) -> Self {
        Self {
            kind,
            comment,
            name,
            action,
            resolve,
        }
    }

    /// Perform the deferred access and hand its result to the suspended caller.
    ///
    /// Returns false if the caller stopped waiting in the meantime. The action
    /// still runs in that case.
    pub fn complete(self) -> bool {
        let result = (self.action)();
        self.resolve.send(result).is_ok()
    }
}

impl fmt::Debug for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Breakpoint")
            .field("kind", &self.kind)
            .field("comment", &self.comment)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Strict FIFO of suspended accesses, shared by every codebox of a run.
#[derive(Debug, Default)]
pub struct BreakpointQueue {
    points: VecDeque<Breakpoint>,
}

impl BreakpointQueue {
    pub fn new() -> Self {
        Self {
            points: VecDeque::new(),
        }
    }

    pub fn put(&mut self, breakpoint: Breakpoint) {
        self.points.push_back(breakpoint);
    }

    pub fn pop(&mut self) -> Option<Breakpoint> {
        self.points.pop_front()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop every pending breakpoint without running its action.
    pub fn clear(&mut self) -> usize {
        let dropped = self.points.len();
        self.points.clear();
        dropped
    }
}
