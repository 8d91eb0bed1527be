mod console;
mod demo;

use clap::Parser;
use codebox_debugger::config::{ConfigError, SessionConfig};
use codebox_debugger::{logging, RunState};
use demo::Scenario;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use thiserror::Error;

/// Run finished with every codebox succeeding.
const EXIT_OK: u8 = 0;
/// Run stopped on a runtime or codebox error.
const EXIT_FAILED: u8 = 1;
/// Operator quit, or a codebox halted the run, before a terminal state.
const EXIT_INCOMPLETE: u8 = 2;
/// Bad configuration or startup failure.
const EXIT_INVALID: u8 = 3;

#[derive(Parser)]
#[command(
    name = "codebox-debugger",
    version,
    about = "Run the demo codeboxes under the variable-watching debugger"
)]
struct Cli {
    /// JSON session config; flags below override it.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Enable debug mode (watched accesses suspend).
    #[arg(long)]
    debug: bool,
    /// Watch a variable name. Repeatable.
    #[arg(long = "watch", value_name = "NAME")]
    watch: Vec<String>,
    /// Print a notification for suspended accesses of this kind (GetVar, SetVar). Repeatable.
    #[arg(long = "notify", value_name = "KIND")]
    notify: Vec<String>,
    /// Resume one breakpoint every MS milliseconds.
    #[arg(long, value_name = "MS")]
    auto_continue: Option<u64>,
    #[arg(long, value_enum, default_value_t = Scenario::Done)]
    scenario: Scenario,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not start runtime")]
    Runtime(#[from] io::Error),
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(RunState::Succeeded) => ExitCode::from(EXIT_OK),
        Ok(RunState::Failed(_)) => ExitCode::from(EXIT_FAILED),
        Ok(state) => {
            eprintln!("Run ended incomplete: {:?}", state);
            ExitCode::from(EXIT_INCOMPLETE)
        }
        Err(err) => {
            eprintln!("error: {}", err);
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = std::error::Error::source(cause);
            }
            ExitCode::from(EXIT_INVALID)
        }
    }
}

fn run(cli: Cli) -> Result<RunState, AppError> {
    let config = session_config(&cli)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let state = rt.block_on(session(config, cli.scenario))?;
    // Stdin is read on a blocking thread that may never return.
    rt.shutdown_background();
    Ok(state)
}

fn session_config(cli: &Cli) -> Result<SessionConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::load(path)?,
        None => SessionConfig::default(),
    };

    config.debug |= cli.debug;
    config.watch.extend(cli.watch.iter().cloned());
    config.notify.extend(cli.notify.iter().cloned());
    if cli.auto_continue.is_some() {
        config.auto_continue_ms = cli.auto_continue;
    }
    Ok(config)
}

async fn session(config: SessionConfig, scenario: Scenario) -> Result<RunState, ConfigError> {
    let kinds = config.notify_kinds()?;

    let mut runner = demo::build(scenario);
    console::install_hooks(&mut runner);

    let debugger = runner.debugger();
    for name in &config.watch {
        debugger.watch(name);
    }
    for kind in kinds {
        console::notify_on(&debugger, kind);
    }

    eprintln!(
        "Running {} codeboxes (debug: {}, watching: {:?})",
        runner.len(),
        config.debug,
        debugger.watching()
    );

    let auto_continue = config.auto_continue_ms.map(Duration::from_millis);
    tokio::select! {
        _ = runner.run(config.debug) => {}
        _ = console::operate(&debugger, auto_continue) => {
            eprintln!("Operator quit.");
        }
    }

    Ok(runner.state())
}
