// tests/interactive_simulation.rs
// Simulates an operator driving the debugger while a run is in progress

use codebox_debugger::{
    BreakpointEvent, BreakpointKind, Codebox, Debugger, ErrorKind, RunState, Runner, RunnerError,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

#[cfg(test)]
mod interactive_tests {
    use super::*;

    // Fail instead of hanging if a scenario never settles
    async fn within<F: Future>(scenario: F) -> F::Output {
        tokio::time::timeout(Duration::from_secs(5), scenario)
            .await
            .expect("Scenario did not settle in time")
    }

    async fn wait_for_pending(debugger: &Debugger, count: usize) {
        while debugger.pending() < count {
            tokio::task::yield_now().await;
        }
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        while !condition() {
            tokio::task::yield_now().await;
        }
    }

    fn record_result(runner: &mut Runner) -> Rc<RefCell<Option<Value>>> {
        let result = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&result);
        runner.on_success(move |value| *slot.borrow_mut() = Some(value));
        result
    }

    // box1 sets str_a = "abc"; box2 reads it back and succeeds with it
    fn str_a_runner() -> Runner {
        let mut runner = Runner::new();
        runner.add_codebox(Codebox::new("box1", "box1 description").with_entry(
            |step| async move {
                let result = step.set_var("set str_a to abc", "str_a", "abc").await;
                step.settle(result.map(|_| Value::Null).map_err(RunnerError::from));
            },
        ));
        runner.add_codebox(Codebox::new("box2", "box2 description").with_entry(
            |step| async move {
                let result = step.get_var("read str_a", "str_a").await;
                step.settle(result.map_err(RunnerError::from));
            },
        ));
        runner
    }

    #[tokio::test]
    async fn test_watched_read_waits_for_continue() {
        let mut runner = str_a_runner();
        let result = record_result(&mut runner);
        let debugger = runner.debugger();
        debugger.watch("str_a");
        // Both box1's write and box2's read of str_a suspend
        let operator = async {
            wait_for_pending(&debugger, 1).await;
            assert_eq!(runner.state(), RunState::Running { step: 0 });
            assert!(result.borrow().is_none(), "Run must not finish while suspended");
            assert!(debugger.resume(), "First continue resumes box1's write");

            wait_for_pending(&debugger, 1).await;
            assert_eq!(runner.state(), RunState::Running { step: 1 });
            assert!(result.borrow().is_none());
            assert!(debugger.resume(), "Second continue resumes box2's read");
        };

        within(async { tokio::join!(runner.run(true), operator) }).await;

        assert_eq!(*result.borrow(), Some(json!("abc")));
        assert!(!debugger.resume(), "Nothing should be left to continue");
    }

    #[tokio::test]
    async fn test_unwatched_write_then_watched_read() {
        let mut runner = Runner::new();
        let debugger = runner.debugger();
        let watcher = debugger.clone();
        runner.add_codebox(Codebox::new("box1", "box1 description").with_entry(
            move |step| {
                let watcher = watcher.clone();
                async move {
                    let result = step.set_var("set str_a to abc", "str_a", "abc").await;
                    // Watched only from here on, so this write went straight through
                    watcher.watch("str_a");
                    step.settle(result.map(|_| Value::Null).map_err(RunnerError::from));
                }
            },
        ));
        runner.add_codebox(Codebox::new("box2", "box2 description").with_entry(
            |step| async move {
                let result = step.get_var("read str_a", "str_a").await;
                step.settle(result.map_err(RunnerError::from));
            },
        ));
        let result = record_result(&mut runner);
        let reads = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&reads);
        debugger.on(BreakpointKind::GetVar, move |event: &BreakpointEvent| {
            log.borrow_mut().push(event.clone());
        });

        let operator = async {
            wait_for_pending(&debugger, 1).await;
            assert_eq!(runner.state(), RunState::Running { step: 1 });
            assert!(result.borrow().is_none(), "box2 must wait for a continue");
            assert!(debugger.resume());
        };

        within(async { tokio::join!(runner.run(true), operator) }).await;

        assert_eq!(*result.borrow(), Some(json!("abc")));
        assert_eq!(
            *reads.borrow(),
            vec![BreakpointEvent {
                comment: "read str_a".to_string(),
                name: "str_a".to_string(),
            }]
        );
        assert!(!debugger.resume(), "Exactly one continue was needed");
    }

    #[tokio::test]
    async fn test_continue_on_empty_queue_returns_false() {
        let runner = str_a_runner();
        let debugger = runner.debugger();

        assert!(!debugger.resume());
        assert_eq!(debugger.pending(), 0);
        assert_eq!(runner.state(), RunState::NotStarted);
    }

    #[tokio::test]
    async fn test_unwatched_access_needs_no_continue() {
        let mut runner = str_a_runner();
        let result = record_result(&mut runner);
        runner.debugger().watch("something_else");

        within(runner.run(true)).await;

        assert_eq!(*result.borrow(), Some(json!("abc")));
    }

    #[tokio::test]
    async fn test_watch_then_unwatch_does_not_suspend() {
        let mut runner = Runner::new();
        runner.add_codebox(Codebox::new("box1", "touches x").with_entry(|step| async move {
            let result = async {
                step.set_var("write x", "x", 1).await?;
                step.get_var("read x", "x").await
            }
            .await;
            step.settle(result.map_err(RunnerError::from));
        }));
        let result = record_result(&mut runner);
        let debugger = runner.debugger();

        assert!(debugger.watch("x"));
        assert!(!debugger.watch("x"), "Second watch should report already watched");
        assert!(debugger.unwatch("x"));
        assert!(!debugger.unwatch("x"), "Second unwatch should report not watched");

        within(runner.run(true)).await;

        assert_eq!(*result.borrow(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_watch_is_case_sensitive() {
        let mut runner = str_a_runner();
        let result = record_result(&mut runner);
        runner.debugger().watch("STR_A");

        within(runner.run(true)).await;

        assert_eq!(*result.borrow(), Some(json!("abc")));
    }

    #[tokio::test]
    async fn test_watch_ignored_outside_debug_mode() {
        let mut runner = str_a_runner();
        let result = record_result(&mut runner);
        let debugger = runner.debugger();
        debugger.watch("str_a");

        within(runner.run(false)).await;

        assert_eq!(*result.borrow(), Some(json!("abc")));
        assert_eq!(debugger.pending(), 0);
    }

    #[tokio::test]
    async fn test_stalls_without_continue() {
        let runner = str_a_runner();
        let debugger = runner.debugger();
        debugger.watch("str_a");

        let stalled = tokio::time::timeout(Duration::from_millis(50), runner.run(true)).await;

        assert!(stalled.is_err(), "Run should not finish without a continue");
        assert_eq!(runner.state(), RunState::Running { step: 0 });
        assert_eq!(debugger.pending(), 1);
    }

    #[tokio::test]
    async fn test_breakpoints_resume_in_arrival_order() {
        let mut runner = Runner::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let trail = Rc::clone(&order);
        runner.add_codebox(Codebox::new("box1", "two reads at once").with_entry(
            move |step| {
                let trail = Rc::clone(&trail);
                async move {
                    let first = async {
                        let value = step.get_var("read a", "a").await;
                        trail.borrow_mut().push("a");
                        value
                    };
                    let second = async {
                        let value = step.get_var("read b", "b").await;
                        trail.borrow_mut().push("b");
                        value
                    };
                    let (a, b) = futures::join!(first, second);
                    let result = a.and(b).map_err(RunnerError::from);
                    step.settle(result);
                }
            },
        ));
        let debugger = runner.debugger();
        debugger.watch("a");
        debugger.watch("b");

        let operator = async {
            wait_for_pending(&debugger, 2).await;
            assert!(debugger.resume());
            wait_until(|| !order.borrow().is_empty()).await;
            assert_eq!(*order.borrow(), vec!["a"], "Oldest breakpoint resumes first");
            assert!(debugger.resume());
        };

        within(async { tokio::join!(runner.run(true), operator) }).await;

        assert_eq!(*order.borrow(), vec!["a", "b"]);
        assert_eq!(runner.state(), RunState::Succeeded);
    }

    #[tokio::test]
    async fn test_earlier_codebox_breakpoint_stays_ahead() {
        let mut runner = Runner::new();
        // box1 finishes its step while its own write is still suspended
        runner.add_codebox(Codebox::new("box1", "leaves a write behind").with_entry(
            |step| async move {
                let runtime = step.runtime().clone();
                let mut write = Box::pin(runtime.set_var("late write", "a", "from box1"));
                assert!(futures::poll!(&mut write).is_pending());
                step.resolve(Value::Null);
            },
        ));
        runner.add_codebox(Codebox::new("box2", "reads a").with_entry(|step| async move {
            let result = step.get_var("read a", "a").await;
            step.settle(result.map_err(RunnerError::from));
        }));
        let result = record_result(&mut runner);
        let names = Rc::new(RefCell::new(Vec::new()));
        let debugger = runner.debugger();
        for kind in [BreakpointKind::GetVar, BreakpointKind::SetVar] {
            let log = Rc::clone(&names);
            debugger.on(kind, move |event: &BreakpointEvent| {
                log.borrow_mut().push(format!("{}:{}", kind, event.comment));
            });
        }
        debugger.watch("a");

        let operator = async {
            wait_for_pending(&debugger, 2).await;
            assert_eq!(runner.state(), RunState::Running { step: 1 });
            // Front of the queue is box1's write, not box2's read
            assert!(debugger.resume());
            assert_eq!(debugger.pending(), 1);
            assert!(result.borrow().is_none());
            assert!(debugger.resume());
        };

        within(async { tokio::join!(runner.run(true), operator) }).await;

        assert_eq!(
            *names.borrow(),
            vec!["SetVar:late write", "GetVar:read a"]
        );
        assert_eq!(
            *result.borrow(),
            Some(json!("from box1")),
            "The write resumed first, so the read sees its value"
        );
    }

    #[tokio::test]
    async fn test_notification_fires_before_suspension() {
        let mut runner = str_a_runner();
        let debugger = runner.debugger();
        let events = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&events);
        debugger.on(BreakpointKind::SetVar, move |event: &BreakpointEvent| {
            log.borrow_mut().push(event.clone());
        });
        debugger.watch("str_a");
        let result = record_result(&mut runner);

        let operator = async {
            wait_for_pending(&debugger, 1).await;
            assert_eq!(
                *events.borrow(),
                vec![BreakpointEvent {
                    comment: "set str_a to abc".to_string(),
                    name: "str_a".to_string(),
                }],
                "SetVar callback fires as the write is suspended"
            );
            debugger.resume();
            wait_for_pending(&debugger, 1).await;
            assert_eq!(events.borrow().len(), 1, "GetVar has no callback registered");
            debugger.resume();
        };

        within(async { tokio::join!(runner.run(true), operator) }).await;

        assert_eq!(*result.borrow(), Some(json!("abc")));
    }

    #[tokio::test]
    async fn test_on_replaces_previous_callback() {
        let mut runner = str_a_runner();
        let debugger = runner.debugger();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let first = Rc::clone(&calls);
        debugger.on(BreakpointKind::GetVar, move |_: &BreakpointEvent| {
            first.borrow_mut().push("first");
        });
        let second = Rc::clone(&calls);
        debugger.on(BreakpointKind::GetVar, move |_: &BreakpointEvent| {
            second.borrow_mut().push("second");
        });
        debugger.watch("str_a");
        let result = record_result(&mut runner);

        let operator = async {
            wait_for_pending(&debugger, 1).await;
            debugger.resume();
            wait_for_pending(&debugger, 1).await;
            debugger.resume();
        };

        within(async { tokio::join!(runner.run(true), operator) }).await;

        assert_eq!(*calls.borrow(), vec!["second"]);
        assert!(result.borrow().is_some());
    }

    #[tokio::test]
    async fn test_panicking_callback_does_not_affect_access() {
        let mut runner = str_a_runner();
        let debugger = runner.debugger();
        debugger.on(BreakpointKind::SetVar, |_: &BreakpointEvent| {
            panic!("observer failure");
        });
        debugger.watch("str_a");
        let result = record_result(&mut runner);

        let operator = async {
            wait_for_pending(&debugger, 1).await;
            assert!(debugger.resume());
            wait_for_pending(&debugger, 1).await;
            assert!(debugger.resume());
        };

        within(async { tokio::join!(runner.run(true), operator) }).await;

        assert_eq!(*result.borrow(), Some(json!("abc")));
        assert_eq!(runner.state(), RunState::Succeeded);
    }

    #[tokio::test]
    async fn test_unwatch_keeps_queued_breakpoints() {
        let mut runner = str_a_runner();
        let result = record_result(&mut runner);
        let debugger = runner.debugger();
        debugger.watch("str_a");

        let operator = async {
            wait_for_pending(&debugger, 1).await;
            assert!(debugger.unwatch("str_a"));
            assert_eq!(debugger.pending(), 1, "Unwatch must not drain the queue");
            assert!(debugger.resume());
        };

        within(async { tokio::join!(runner.run(true), operator) }).await;

        // box2's read was no longer watched, so one continue was enough
        assert_eq!(*result.borrow(), Some(json!("abc")));
    }

    #[tokio::test]
    async fn test_abandoned_breakpoint_fails_as_codebox_error() {
        let mut runner = str_a_runner();
        let failures = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&failures);
        runner.on_codebox_error(move |error, codebox| {
            log.borrow_mut()
                .push((codebox.id.clone(), error.kind(), error.message().to_string()));
        });
        let debugger = runner.debugger();
        debugger.watch("str_a");

        let operator = async {
            wait_for_pending(&debugger, 1).await;
            assert_eq!(debugger.abandon_all(), 1);
            assert_eq!(debugger.pending(), 0);
        };

        within(async { tokio::join!(runner.run(true), operator) }).await;

        let failures = failures.borrow();
        assert_eq!(failures.len(), 1);
        let (id, kind, message) = &failures[0];
        assert_eq!(id, "box1");
        assert_eq!(*kind, ErrorKind::CodeboxError);
        assert!(message.contains("str_a"), "Message should name the variable: {}", message);
        assert_eq!(runner.state(), RunState::Failed(ErrorKind::CodeboxError));
    }
}
