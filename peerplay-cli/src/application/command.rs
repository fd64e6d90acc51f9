use crate::infrastructure::error::{CliError, Result};

pub const HELP: &str = "\
commands:
  users                 list peers that are online
  select <index|id>     pick an opponent (starts a fresh game)
  call                  start a media call with the selected peer
  move <row> <col>      claim a cell, e.g. `move 0 2` or `move 0-2`
  board                 show the board
  help                  show this help
  quit                  leave";

/// One line typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Users,
    Select(String),
    Call,
    Move { row: u8, col: u8 },
    Board,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(CliError::Usage("type `help` for the list of commands"));
    };
    let args: Vec<&str> = words.collect();

    match (verb.to_lowercase().as_str(), args.as_slice()) {
        ("users" | "ls", []) => Ok(Command::Users),
        ("select", [target]) => Ok(Command::Select(target.to_string())),
        ("select", _) => Err(CliError::Usage("select <index|id>")),
        ("call", []) => Ok(Command::Call),
        ("move", [cell]) => match cell.split_once('-') {
            Some((row, col)) => parse_cell(row, col),
            None => Err(CliError::Usage("move <row> <col>")),
        },
        ("move", [row, col]) => parse_cell(row, col),
        ("move", _) => Err(CliError::Usage("move <row> <col>")),
        ("board", []) => Ok(Command::Board),
        ("help" | "?", _) => Ok(Command::Help),
        ("quit" | "exit", _) => Ok(Command::Quit),
        _ => Err(CliError::UnknownCommand(line.trim().to_string())),
    }
}

fn parse_cell(row: &str, col: &str) -> Result<Command> {
    match (row.parse(), col.parse()) {
        (Ok(row), Ok(col)) => Ok(Command::Move { row, col }),
        _ => Err(CliError::Usage("move <row> <col> with digits 0-2")),
    }
}
