use std::str::FromStr;

use thiserror::Error;

/// A user action, parsed from one line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Lap,
    Reset,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command {0:?}, try 'help'")]
pub struct ParseCommandError(String);

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Single-letter aliases match the usual stopwatch key bindings
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "lap" | "l" => Ok(Command::Lap),
            "reset" | "r" => Ok(Command::Reset),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(ParseCommandError(other.to_string())),
        }
    }
}
