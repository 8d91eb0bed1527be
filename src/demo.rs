use clap::ValueEnum;
use codebox_debugger::{Codebox, Runner, RunnerError};
use serde_json::{json, Value};

/// How the second demo codebox ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Read `str_a` and succeed with it.
    Done,
    /// Reject with a runtime error before reading.
    Cast,
    /// Read `str_a` and fail to interpret it as a number.
    Fault,
}

/// Two codeboxes: box1 writes `str_a = "abc"`, box2 reads it back.
pub fn build(scenario: Scenario) -> Runner {
    let mut runner = Runner::new();

    runner.add_codebox(
        Codebox::new("box1", "box1 description").with_entry(|step| async move {
            eprintln!("Codebox-1: setting str_a");
            match step.set_var("set str_a to abc", "str_a", "abc").await {
                Ok(()) => step.resolve(Value::Null),
                Err(err) => step.reject(err.into()),
            }
        }),
    );

    runner.add_codebox(
        Codebox::new("box2", "box2 description").with_entry(move |step| async move {
            if scenario == Scenario::Cast {
                step.reject(RunnerError::runtime("runtime get-var error"));
                return;
            }

            eprintln!("Codebox-2: reading str_a");
            let str_a = match step.get_var("read str_a", "str_a").await {
                Ok(value) => value,
                Err(err) => return step.reject(err.into()),
            };
            eprintln!("box2 hello: {}", str_a);

            match scenario {
                Scenario::Fault => match serde_json::from_value::<u64>(str_a) {
                    Ok(n) => step.resolve(n),
                    Err(err) => step.reject(RunnerError::codebox(err)),
                },
                _ => step.resolve(json!({ "str_a": str_a })),
            }
        }),
    );

    runner
}
