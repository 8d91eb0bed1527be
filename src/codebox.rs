use crate::executor::Step;
use futures::future::{FutureExt, LocalBoxFuture};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

pub type EntryFuture = LocalBoxFuture<'static, ()>;

type Entry = Rc<dyn Fn(Step) -> EntryFuture>;

/// One unit of sequential work.
///
/// The entry receives the [`Step`] for its run and must finish it exactly
/// once through `resolve`, `reject` or `settle`. An entry that drops its step
/// unfinished halts the runner.
#[derive(Clone)]
pub struct Codebox {
    pub id: String,
    pub description: String,
    entry: Entry,
}

impl Codebox {
    /// Create a codebox whose entry does nothing.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            entry: Rc::new(|_step: Step| async {}.boxed_local()),
        }
    }

    pub fn with_entry<F, Fut>(mut self, entry: F) -> Self
    where
        F: Fn(Step) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.set_entry(entry);
        self
    }

    pub fn set_entry<F, Fut>(&mut self, entry: F)
    where
        F: Fn(Step) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        self.entry = Rc::new(move |step: Step| entry(step).boxed_local());
    }

    pub(crate) fn start(&self, step: Step) -> EntryFuture {
        (self.entry)(step)
    }
}

impl Default for Codebox {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl fmt::Debug for Codebox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codebox")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
