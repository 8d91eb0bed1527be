mod breakpoints;
mod events;
mod watch;

pub use breakpoints::{Breakpoint, BreakpointAction, BreakpointQueue};
pub use events::{BreakpointEvent, BreakpointKind};
pub use watch::WatchList;

use futures::channel::oneshot;
use serde_json::Value;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use tracing::{debug, info, warn};

type EventCallback = Rc<dyn Fn(&BreakpointEvent)>;

#[derive(Default)]
struct DebuggerState {
    watching: RefCell<WatchList>,
    breakpoints: RefCell<BreakpointQueue>,
    on_get_var: RefCell<Option<EventCallback>>,
    on_set_var: RefCell<Option<EventCallback>>,
}

/// Watch list plus breakpoint queue for one runner.
///
/// Cloning yields another handle to the same debugger, which is how an
/// operator keeps control of it while the runner is executing.
#[derive(Clone, Default)]
pub struct Debugger {
    state: Rc<DebuggerState>,
}

impl Debugger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_watching(&self, name: &str) -> bool {
        self.state.watching.borrow().contains(name)
    }

    /// Start watching `name`. Returns false if it was already watched.
    pub fn watch(&self, name: &str) -> bool {
        let added = self.state.watching.borrow_mut().add(name);
        if added {
            info!(name, "watching variable");
        }
        added
    }

    /// Stop watching `name`. Breakpoints already queued for it stay queued.
    pub fn unwatch(&self, name: &str) -> bool {
        let existed = self.state.watching.borrow_mut().remove(name);
        if existed {
            info!(name, "no longer watching variable");
        }
        existed
    }

    pub fn watching(&self) -> Vec<String> {
        self.state.watching.borrow().sorted()
    }

    /// Number of suspended accesses waiting for `resume`.
    pub fn pending(&self) -> usize {
        self.state.breakpoints.borrow().len()
    }

    /// Register the notification callback for `kind`, replacing any previous one.
    pub fn on<F>(&self, kind: BreakpointKind, callback: F)
    where
        F: Fn(&BreakpointEvent) + 'static,
    {
        let slot = match kind {
            BreakpointKind::GetVar => &self.state.on_get_var,
            BreakpointKind::SetVar => &self.state.on_set_var,
        };
        *slot.borrow_mut() = Some(Rc::new(callback));
    }

    /// Suspend an access: notify, then queue it behind every earlier breakpoint.
    ///
    /// The returned receiver yields the action's result once the breakpoint
    /// reaches the front of the queue and `resume` is called.
    pub fn enter_breakpoint(
        &self,
        kind: BreakpointKind,
        comment: &str,
        name: &str,
        action: BreakpointAction,
    ) -> oneshot::Receiver<Value> {
        self.notify(kind, comment, name);

        let (resolve, suspended) = oneshot::channel();
        let mut breakpoints = self.state.breakpoints.borrow_mut();
        breakpoints.put(Breakpoint::new(
            kind,
            comment.to_string(),
            name.to_string(),
            action,
            resolve,
        ));
        debug!(%kind, name, comment, pending = breakpoints.len(), "breakpoint queued");

        suspended
    }

    /// Resume the oldest suspended access. Returns false when nothing is pending.
    pub fn resume(&self) -> bool {
        let front = self.state.breakpoints.borrow_mut().pop();
        match front {
            Some(breakpoint) => {
                debug!(kind = %breakpoint.kind, name = %breakpoint.name, "resuming breakpoint");
                let name = breakpoint.name.clone();
                if !breakpoint.complete() {
                    debug!(name = %name, "suspended caller stopped waiting; result dropped");
                }
                true
            }
            None => false,
        }
    }

    /// Drop every queued breakpoint. Their callers fail with `AccessError::Abandoned`.
    pub fn abandon_all(&self) -> usize {
        let dropped = self.state.breakpoints.borrow_mut().clear();
        if dropped > 0 {
            warn!(dropped, "abandoned pending breakpoints");
        }
        dropped
    }

    fn notify(&self, kind: BreakpointKind, comment: &str, name: &str) {
        let slot = match kind {
            BreakpointKind::GetVar => &self.state.on_get_var,
            BreakpointKind::SetVar => &self.state.on_set_var,
        };
        // Clone out so the callback may re-register itself.
        let Some(callback) = slot.borrow().clone() else {
            return;
        };

        let event = BreakpointEvent {
            comment: comment.to_string(),
            name: name.to_string(),
        };
        if panic::catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
            warn!(%kind, name, "breakpoint notification callback panicked; ignored");
        }
    }
}
