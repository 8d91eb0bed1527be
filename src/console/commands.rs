use thiserror::Error;

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorCommand {
    Continue,
    Watch(String),
    Unwatch(String),
    Pending,
    Watching,
    Abandon,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unbalanced quotes in input")]
    Unbalanced,
    #[error("`{0}` needs a variable name")]
    MissingName(&'static str),
    #[error("unknown command: {0}")]
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  c, continue       resume the oldest pending breakpoint
  watch <name>      suspend accesses to <name>
  unwatch <name>    stop suspending accesses to <name>
  pending           number of suspended accesses
  watching          list watched names
  abandon           drop every pending breakpoint
  help              show this text
  q, quit           stop the session";

/// Parse an input line. Blank lines yield `Ok(None)`.
///
/// Names are tokenised shell-style, so `watch "my var"` watches `my var`.
pub fn parse_command(line: &str) -> Result<Option<OperatorCommand>, CommandError> {
    let tokens = shlex::split(line).ok_or(CommandError::Unbalanced)?;
    let mut tokens = tokens.into_iter();

    let Some(head) = tokens.next() else {
        return Ok(None);
    };

    let command = match head.as_str() {
        "c" | "continue" => OperatorCommand::Continue,
        "w" | "watch" => {
            OperatorCommand::Watch(tokens.next().ok_or(CommandError::MissingName("watch"))?)
        }
        "u" | "unwatch" => {
            OperatorCommand::Unwatch(tokens.next().ok_or(CommandError::MissingName("unwatch"))?)
        }
        "p" | "pending" => OperatorCommand::Pending,
        "watching" => OperatorCommand::Watching,
        "abandon" => OperatorCommand::Abandon,
        "h" | "help" | "?" => OperatorCommand::Help,
        "q" | "quit" | "exit" => OperatorCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}
