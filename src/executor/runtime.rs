use crate::debugger::{BreakpointAction, BreakpointKind, Debugger};
use crate::error::AccessError;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::trace;

/// Shared variable store of one runner, reachable only through gated accessors.
///
/// Every codebox of a run sees the same store; cloning hands out another
/// handle to it.
#[derive(Clone)]
pub struct Runtime {
    vars: Rc<RefCell<HashMap<String, Value>>>,
    debugger: Debugger,
    debug: Rc<Cell<bool>>,
}

impl Runtime {
    pub(crate) fn new(debugger: Debugger) -> Self {
        Self {
            vars: Rc::new(RefCell::new(HashMap::new())),
            debugger,
            debug: Rc::new(Cell::new(false)),
        }
    }

    pub(crate) fn set_debug(&self, enabled: bool) {
        self.debug.set(enabled);
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.get()
    }

    /// Read `name`. Never-written names read as `Value::Null`.
    pub async fn get_var(&self, comment: &str, name: &str) -> Result<Value, AccessError> {
        let vars = Rc::clone(&self.vars);
        let key = name.to_string();
        let action: BreakpointAction =
            Box::new(move || vars.borrow().get(&key).cloned().unwrap_or(Value::Null));

        self.enter_var_breakpoint(BreakpointKind::GetVar, comment, name, action)
            .await
    }

    /// Write `value` under `name`, replacing whatever was there.
    pub async fn set_var(
        &self,
        comment: &str,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), AccessError> {
        let vars = Rc::clone(&self.vars);
        let key = name.to_string();
        let value = value.into();
        let action: BreakpointAction = Box::new(move || {
            vars.borrow_mut().insert(key, value);
            Value::Null
        });

        self.enter_var_breakpoint(BreakpointKind::SetVar, comment, name, action)
            .await
            .map(|_| ())
    }

    async fn enter_var_breakpoint(
        &self,
        kind: BreakpointKind,
        comment: &str,
        name: &str,
        action: BreakpointAction,
    ) -> Result<Value, AccessError> {
        if self.debug.get() && self.debugger.is_watching(name) {
            let suspended = self.debugger.enter_breakpoint(kind, comment, name, action);
            return suspended.await.map_err(|_| AccessError::Abandoned {
                kind,
                name: name.to_string(),
            });
        }

        trace!(%kind, name, comment, "unwatched access");
        Ok(action())
    }
}
