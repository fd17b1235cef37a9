//! Preview-page commands.

use crate::tonemap::{Gamma, ToneError};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Help text listing preview-page commands.
pub const HELP: &str = "\
Commands:
  <gamma>             set gamma (e.g. 0.8); 0.10-2.00 is the usual range
  gamma <value>       same as above
  save [path]         save the image (default: timestamped PNG in your home directory)
  preview [path]      write a reduced-size preview PNG
  new                 start a new screenshot
  help                show this help
  quit                exit";

/// A parsed preview-page command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Gamma(Gamma),
    Save(Option<PathBuf>),
    Preview(Option<PathBuf>),
    New,
    Help,
    Quit,
}

/// Reasons a command line was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("enter a command (type 'help' for a list)")]
    Empty,
    #[error("unknown command {0:?} (type 'help' for a list)")]
    Unknown(String),
    #[error("'gamma' needs a value")]
    MissingGamma,
    #[error(transparent)]
    Gamma(#[from] ToneError),
}

fn optional_path(rest: &str) -> Option<PathBuf> {
    (!rest.is_empty()).then(|| PathBuf::from(rest))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "gamma" | "g" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingGamma);
                }
                Ok(Command::Gamma(rest.parse()?))
            }
            "save" | "s" => Ok(Command::Save(optional_path(rest))),
            "preview" | "p" => Ok(Command::Preview(optional_path(rest))),
            "new" | "n" => Ok(Command::New),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            _ if rest.is_empty() && word.parse::<f64>().is_ok() => Ok(Command::Gamma(word.parse()?)),
            _ => Err(CommandError::Unknown(word.to_string())),
        }
    }
}
