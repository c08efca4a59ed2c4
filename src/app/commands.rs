//! Line-based command parsing.
//!
//! Each input line is one command: a keyword followed by whitespace-separated
//! arguments. Keywords are case-insensitive; arguments are taken verbatim.

use std::str::FromStr;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString};

use crate::error_handling::CommandError;

/// Command keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum CommandKind {
    Start,
    Stop,
    Status,
    Help,
    Quit,
}

impl CommandKind {
    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::Start => "start <destination> <url> <notify-target> [image-link]",
            CommandKind::Stop => "stop <destination> [number]",
            CommandKind::Status => "status <destination>",
            CommandKind::Help => "help",
            CommandKind::Quit => "quit",
        }
    }
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start {
        destination: String,
        url: String,
        notify_target: String,
        image_link: Option<String>,
    },
    /// Without an index, lists the destination's monitors instead.
    Stop {
        destination: String,
        index: Option<usize>,
    },
    Status {
        destination: String,
    },
    Help,
    Quit,
}

impl Command {
    /// Parses one input line.
    ///
    /// # Returns
    ///
    /// `Ok(None)` for a blank line.
    ///
    /// # Errors
    ///
    /// `CommandError::Usage` for an unknown keyword, a wrong argument count,
    /// or a product number that is not a number.
    pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(None);
        };
        let kind = CommandKind::from_str(keyword).map_err(|_| CommandError::Usage(help_text()))?;
        let args: Vec<&str> = words.collect();
        let usage = || CommandError::Usage(kind.usage().to_string());

        let command = match (kind, args.as_slice()) {
            (CommandKind::Start, [destination, url, notify_target, rest @ ..]) if rest.len() <= 1 => {
                Command::Start {
                    destination: destination.to_string(),
                    url: url.to_string(),
                    notify_target: notify_target.to_string(),
                    image_link: rest.first().map(|link| link.to_string()),
                }
            }
            (CommandKind::Stop, [destination]) => Command::Stop {
                destination: destination.to_string(),
                index: None,
            },
            (CommandKind::Stop, [destination, index]) => Command::Stop {
                destination: destination.to_string(),
                index: Some(index.parse().map_err(|_| usage())?),
            },
            (CommandKind::Status, [destination]) => Command::Status {
                destination: destination.to_string(),
            },
            (CommandKind::Help, []) => Command::Help,
            (CommandKind::Quit, []) => Command::Quit,
            _ => return Err(usage()),
        };
        Ok(Some(command))
    }
}

/// Usage of every command, one per line.
pub fn help_text() -> String {
    let lines: Vec<&str> = CommandKind::iter().map(CommandKind::usage).collect();
    format!("commands:\n  {}", lines.join("\n  "))
}
