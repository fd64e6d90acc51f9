use crate::domain::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The eight index triples that complete a line on a 3×3 board
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Errors when parsing a `"<row>-<col>"` position
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PositionError {
    #[error("Position must look like '<row>-<col>', got '{0}'")]
    Malformed(String),

    #[error("Row and column must be 0, 1 or 2 (got {row}-{col})")]
    OutOfRange { row: u8, col: u8 },
}

/// A cell on the board, addressed by row and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Result<Self, PositionError> {
        if row > 2 || col > 2 {
            return Err(PositionError::OutOfRange { row, col });
        }
        Ok(Self { row, col })
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < 9).then(|| Self {
            row: (index / 3) as u8,
            col: (index % 3) as u8,
        })
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn col(&self) -> u8 {
        self.col
    }

    /// Board index (`row * 3 + col`)
    pub fn index(&self) -> usize {
        self.row as usize * 3 + self.col as usize
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PositionError::Malformed(s.to_string());

        let (row, col) = s.split_once('-').ok_or_else(malformed)?;
        let digit = |part: &str| -> Result<u8, PositionError> {
            let mut chars = part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c.to_digit(10).map(|d| d as u8).ok_or_else(malformed),
                _ => Err(malformed()),
            }
        };

        Position::new(digit(row)?, digit(col)?)
    }
}

impl TryFrom<String> for Position {
    type Error = PositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.to_string()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Which player a move belongs to, from the local point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Local,
    Opponent,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Local => Side::Opponent,
            Side::Opponent => Side::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Local,
    Opponent,
}

impl From<Side> for Cell {
    fn from(side: Side) -> Self {
        match side {
            Side::Local => Cell::Local,
            Side::Opponent => Cell::Opponent,
        }
    }
}

/// 3×3 board; a cell only ever moves from `Empty` to a claimed state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; 9],
}

impl Board {
    pub fn cell(&self, position: Position) -> Cell {
        self.cells[position.index()]
    }

    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| *c != Cell::Empty)
    }

    fn claim(&mut self, position: Position, side: Side) {
        self.cells[position.index()] = side.into();
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(3) {
            let line: Vec<&str> = row
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => ".",
                    Cell::Local => "X",
                    Cell::Opponent => "O",
                })
                .collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Append-only record of the cells one side has claimed, in play order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MoveSet {
    indices: Vec<usize>,
}

impl MoveSet {
    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// True if the set covers any complete line
    pub fn has_line(&self) -> bool {
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|index| self.contains(*index)))
    }

    fn push(&mut self, index: usize) {
        self.indices.push(index);
    }
}

impl FromIterator<usize> for MoveSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = MoveSet::default();
        for index in iter {
            if !set.contains(index) {
                set.push(index);
            }
        }
        set
    }
}

/// How strictly incoming and outgoing moves are checked.
///
/// Occupied cells are rejected under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MoveRules {
    /// Any side may move at any time
    #[default]
    Open,
    /// Sides must alternate, starting with the first mover
    Alternating,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MoveError {
    #[error("The game already has a winner")]
    AlreadyDecided,

    #[error("Cell {0} is already claimed")]
    Occupied(Position),

    #[error("It is not this side's turn")]
    NotYourTurn,

    #[error("No opponent selected")]
    NoGame,

    #[error("Move came from a peer that is not the opponent")]
    NotOpponent,
}

/// Result of an accepted move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub position: Position,
    /// Set when this move decided the game
    pub decided: Option<Side>,
}

/// Replicated two-player game between the local user and one opponent.
///
/// Each peer keeps its own copy and feeds the other's moves in through
/// [`GameSession::receive_remote`]; the winner, once set, never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    local: Identity,
    opponent: Identity,
    board: Board,
    local_moves: MoveSet,
    opponent_moves: MoveSet,
    winner: Option<Side>,
    rules: MoveRules,
    first_mover: Option<Side>,
}

impl GameSession {
    pub fn new(local: Identity, opponent: Identity, rules: MoveRules) -> Self {
        Self {
            local,
            opponent,
            board: Board::default(),
            local_moves: MoveSet::default(),
            opponent_moves: MoveSet::default(),
            winner: None,
            rules,
            first_mover: None,
        }
    }

    /// Fix who opens the game. Ignored once any move was made.
    pub fn set_first_mover(&mut self, side: Side) {
        if self.local_moves.is_empty() && self.opponent_moves.is_empty() {
            self.first_mover = Some(side);
        }
    }

    pub fn local(&self) -> &Identity {
        &self.local
    }

    pub fn opponent(&self) -> &Identity {
        &self.opponent
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn local_moves(&self) -> &MoveSet {
        &self.local_moves
    }

    pub fn opponent_moves(&self) -> &MoveSet {
        &self.opponent_moves
    }

    pub fn rules(&self) -> MoveRules {
        self.rules
    }

    pub fn winner_side(&self) -> Option<Side> {
        self.winner
    }

    /// Identity of the winner, if the game is decided
    pub fn winner(&self) -> Option<&Identity> {
        self.winner.map(|side| match side {
            Side::Local => &self.local,
            Side::Opponent => &self.opponent,
        })
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none() && self.board.is_full()
    }

    /// Side expected to move next under `Alternating` rules
    pub fn next_to_move(&self) -> Option<Side> {
        let first = self.first_mover?;
        let played = self.local_moves.len() + self.opponent_moves.len();
        Some(if played % 2 == 0 { first } else { first.other() })
    }

    /// Claim a cell for the local player
    pub fn play_local(&mut self, position: Position) -> Result<MoveOutcome, MoveError> {
        if self.winner.is_some() {
            return Err(MoveError::AlreadyDecided);
        }
        self.apply(Side::Local, position)
    }

    /// Record a cell claimed by the opponent.
    ///
    /// Accepted even after the game is decided; the winner is left untouched.
    pub fn receive_remote(&mut self, position: Position) -> Result<MoveOutcome, MoveError> {
        self.apply(Side::Opponent, position)
    }

    fn apply(&mut self, side: Side, position: Position) -> Result<MoveOutcome, MoveError> {
        if self.board.cell(position) != Cell::Empty {
            return Err(MoveError::Occupied(position));
        }

        if self.rules == MoveRules::Alternating {
            match self.next_to_move() {
                Some(expected) if expected != side => return Err(MoveError::NotYourTurn),
                Some(_) => {}
                None => self.first_mover = Some(side),
            }
        }

        self.board.claim(position, side);
        match side {
            Side::Local => self.local_moves.push(position.index()),
            Side::Opponent => self.opponent_moves.push(position.index()),
        }

        let decided = self.check_winner();
        if let Some(winner) = decided {
            tracing::info!(
                "Game decided at {}: {} wins",
                position,
                match winner {
                    Side::Local => self.local.name(),
                    Side::Opponent => self.opponent.name(),
                }
            );
        }

        Ok(MoveOutcome { position, decided })
    }

    /// Evaluate both move sets; returns the side that just won, if any.
    ///
    /// Runs only once a side has at least three moves. Local is checked first.
    fn check_winner(&mut self) -> Option<Side> {
        if self.winner.is_some() {
            return None;
        }

        if self.local_moves.len() < 3 && self.opponent_moves.len() < 3 {
            return None;
        }

        let winner = if self.local_moves.has_line() {
            Some(Side::Local)
        } else if self.opponent_moves.has_line() {
            Some(Side::Opponent)
        } else {
            None
        };

        self.winner = winner;
        winner
    }
}
