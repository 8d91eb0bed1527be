mod commands;
mod protocol;

use commands::{parse_command, OperatorCommand, HELP};
use protocol::emit;

use codebox_debugger::{BreakpointEvent, BreakpointKind, Debugger, Runner};
use serde_json::json;
use std::time::Duration;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info};

/// How often breakpoints are drained once operator input is gone.
const DRAIN_INTERVAL: Duration = Duration::from_millis(50);

/// Route the runner's terminal hooks to console events.
pub fn install_hooks(runner: &mut Runner) {
    runner.on_success(|result| {
        emit("done", json!({ "result": result }));
    });
    runner.on_runtime_error(|error, codebox| {
        emit(
            "runtime-error",
            json!({ "codebox": codebox.id, "message": error.message() }),
        );
    });
    runner.on_codebox_error(|error, codebox| {
        emit(
            "codebox-error",
            json!({ "codebox": codebox.id, "message": error.message() }),
        );
    });
}

/// Print a notification whenever an access of `kind` is suspended.
pub fn notify_on(debugger: &Debugger, kind: BreakpointKind) {
    debugger.on(kind, move |event: &BreakpointEvent| {
        emit(
            "breakpoint",
            json!({ "kind": kind, "comment": event.comment, "name": event.name }),
        );
    });
}

/// Operate `debugger` from stdin until the operator quits.
///
/// With `auto_continue` set, one breakpoint is also resumed per tick. When
/// stdin closes the console stops reading and drains breakpoints on its own,
/// so a detached run still finishes.
pub async fn operate(debugger: &Debugger, auto_continue: Option<Duration>) {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut ticker = auto_continue.map(|period| {
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });
    let mut input_open = true;

    eprintln!("Type `help` for commands.");

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) | Err(_) => {
                        info!("operator input closed; draining breakpoints");
                        input_open = false;
                        if ticker.is_none() {
                            ticker = Some(time::interval(DRAIN_INTERVAL));
                        }
                        continue;
                    }
                };

                match parse_command(&line) {
                    Ok(Some(OperatorCommand::Quit)) => return,
                    Ok(Some(command)) => apply(debugger, command),
                    Ok(None) => {}
                    Err(err) => eprintln!("{}", err),
                }
            }
            _ = next_tick(&mut ticker) => {
                if debugger.resume() {
                    emit("continued", json!({ "auto": true, "pending": debugger.pending() }));
                }
            }
        }
    }
}

fn apply(debugger: &Debugger, command: OperatorCommand) {
    debug!(?command, "operator command");
    match command {
        OperatorCommand::Continue => {
            if debugger.resume() {
                emit("continued", json!({ "auto": false, "pending": debugger.pending() }));
            } else {
                eprintln!("Nothing to continue.");
            }
        }
        OperatorCommand::Watch(name) => {
            let added = debugger.watch(&name);
            emit("watch", json!({ "name": name, "added": added }));
        }
        OperatorCommand::Unwatch(name) => {
            let existed = debugger.unwatch(&name);
            emit("unwatch", json!({ "name": name, "existed": existed }));
        }
        OperatorCommand::Pending => {
            emit("pending", json!({ "count": debugger.pending() }));
        }
        OperatorCommand::Watching => {
            emit("watching", json!({ "names": debugger.watching() }));
        }
        OperatorCommand::Abandon => {
            emit("abandoned", json!({ "count": debugger.abandon_all() }));
        }
        OperatorCommand::Help => eprintln!("{}", HELP),
        OperatorCommand::Quit => {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
