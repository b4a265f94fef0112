use crashline_types::{parse_amount, GameError};
use std::fmt;

/// A line typed by the player.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerCommand {
    Bet(f64),
    CashOut,
    History,
    Balance,
    Help,
    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CommandError {
    Empty,
    MissingAmount,
    Amount(GameError),
    Unknown(String),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::MissingAmount => write!(f, "usage: bet <amount>"),
            CommandError::Amount(err) => write!(f, "{err}"),
            CommandError::Unknown(word) => {
                write!(f, "unknown command {word:?} (type \"help\")")
            }
        }
    }
}

impl std::error::Error for CommandError {}

pub const HELP: &str = "\
commands:
  bet <amount>   stake on the next round (alias: b)
  cash           cash out at the current multiplier (alias: c)
  history        recent crash points (alias: h)
  balance        show wallet balance
  help           this text
  quit           leave the table (alias: q)";

pub fn parse_command(line: &str) -> Result<PlayerCommand, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    match head.to_ascii_lowercase().as_str() {
        "bet" | "b" => {
            let raw = words.next().ok_or(CommandError::MissingAmount)?;
            parse_amount(raw)
                .map(PlayerCommand::Bet)
                .map_err(CommandError::Amount)
        }
        "cash" | "c" | "cashout" => Ok(PlayerCommand::CashOut),
        "history" | "h" => Ok(PlayerCommand::History),
        "balance" => Ok(PlayerCommand::Balance),
        "help" | "?" => Ok(PlayerCommand::Help),
        "quit" | "q" | "exit" => Ok(PlayerCommand::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}
