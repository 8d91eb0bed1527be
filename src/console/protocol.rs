use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use tracing::warn;

/// One line of machine-readable console output.
#[derive(Debug, Serialize)]
pub struct ConsoleEvent<'a> {
    pub event: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub body: Value,
}

/// Write `event` to stdout as a single JSON line.
pub fn emit(event: &str, body: Value) {
    let msg = ConsoleEvent { event, body };
    let json = match serde_json::to_string(&msg) {
        Ok(json) => json,
        Err(err) => {
            warn!(event, %err, "could not encode console event");
            return;
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(err) = writeln!(stdout, "{}", json).and_then(|_| stdout.flush()) {
        warn!(event, %err, "could not write console event");
    }
}
