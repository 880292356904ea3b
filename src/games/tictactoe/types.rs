//! Core domain types for tic-tac-toe against the computer.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::instrument;

use super::error::GameError;

/// Which side made a move.
///
/// The human player always moves first and places `X`; the computer
/// answers with `O`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mover {
    /// The authenticated human player.
    Player,
    /// The random computer opponent.
    Computer,
}

impl Mover {
    /// Returns the token this mover places on the board.
    pub fn token(self) -> &'static str {
        match self {
            Mover::Player => "X",
            Mover::Computer => "O",
        }
    }

    /// Parses a mover kind from its stored name (`"player"` / `"computer"`).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlayer`] for any other value.
    #[instrument]
    pub fn parse(kind: &str) -> Result<Self, GameError> {
        kind.parse()
            .map_err(|_| GameError::InvalidPlayer(kind.to_string()))
    }
}

/// Returns the token for a mover kind given by name.
///
/// # Errors
///
/// Returns [`GameError::InvalidPlayer`] if `kind` names neither side.
#[instrument]
pub fn player_token(kind: &str) -> Result<&'static str, GameError> {
    Mover::parse(kind).map(Mover::token)
}

/// Terminal outcome of a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Winner {
    /// The human player completed a line.
    Player,
    /// The computer completed a line.
    Computer,
    /// The board filled up with no line.
    Tie,
}

impl From<Mover> for Winner {
    fn from(mover: Mover) -> Self {
        match mover {
            Mover::Player => Winner::Player,
            Mover::Computer => Winner::Computer,
        }
    }
}

/// A square on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Square {
    /// Nobody has played here yet.
    Empty,
    /// Holds the token of the given mover.
    Occupied(Mover),
}

impl Square {
    /// Symbol used for an empty square in the stored and wire formats.
    pub const EMPTY_SYMBOL: &'static str = ".";

    /// Returns the symbol written for this square.
    pub fn symbol(self) -> &'static str {
        match self {
            Square::Empty => Self::EMPTY_SYMBOL,
            Square::Occupied(mover) => mover.token(),
        }
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.symbol().to_string()
    }
}

impl TryFrom<String> for Square {
    type Error = GameError;

    fn try_from(symbol: String) -> Result<Self, Self::Error> {
        match symbol.as_str() {
            "." => Ok(Square::Empty),
            "X" => Ok(Square::Occupied(Mover::Player)),
            "O" => Ok(Square::Occupied(Mover::Computer)),
            _ => Err(GameError::InvalidSymbol(symbol)),
        }
    }
}

/// A coordinate on the board: `x` is the row, `y` the column, both in `0..=2`.
///
/// A `Coord` can only be built from in-range values, so every board access
/// through it is in bounds. Deserializing goes through [`Coord::new`] too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCoord")]
pub struct Coord {
    x: usize,
    y: usize,
}

/// Unchecked wire form of [`Coord`].
#[derive(Deserialize)]
struct RawCoord {
    x: usize,
    y: usize,
}

impl TryFrom<RawCoord> for Coord {
    type Error = String;

    fn try_from(raw: RawCoord) -> Result<Self, Self::Error> {
        Coord::new(raw.x, raw.y)
            .ok_or_else(|| format!("({}, {}) is off the board", raw.x, raw.y))
    }
}

impl Coord {
    /// All nine coordinates in row-major order.
    pub const ALL: [Coord; 9] = [
        Coord { x: 0, y: 0 },
        Coord { x: 0, y: 1 },
        Coord { x: 0, y: 2 },
        Coord { x: 1, y: 0 },
        Coord { x: 1, y: 1 },
        Coord { x: 1, y: 2 },
        Coord { x: 2, y: 0 },
        Coord { x: 2, y: 1 },
        Coord { x: 2, y: 2 },
    ];

    /// Creates a coordinate, or `None` if either axis is outside `0..=2`.
    pub fn new(x: usize, y: usize) -> Option<Self> {
        (x < Board::SIZE && y < Board::SIZE).then_some(Self { x, y })
    }

    /// Row index.
    pub fn x(self) -> usize {
        self.x
    }

    /// Column index.
    pub fn y(self) -> usize {
        self.y
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 3x3 tic-tac-toe board.
///
/// Boards are plain values. Placing a token returns a new board and leaves
/// the original untouched, so snapshots held by earlier moves never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    rows: [[Square; 3]; 3],
}

impl Board {
    /// Number of rows and columns.
    pub const SIZE: usize = 3;

    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            rows: [[Square::Empty; 3]; 3],
        }
    }

    /// Builds a board from its rows.
    pub fn from_rows(rows: [[Square; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[[Square; 3]; 3] {
        &self.rows
    }

    /// Gets the square at `coord`.
    pub fn get(&self, coord: Coord) -> Square {
        self.rows[coord.x][coord.y]
    }

    /// Checks if the square at `coord` is empty.
    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord) == Square::Empty
    }

    /// Returns a copy of this board with `square` written at `coord`.
    pub fn with(&self, coord: Coord, square: Square) -> Self {
        let mut next = *self;
        next.rows[coord.x][coord.y] = square;
        next
    }

    /// Empty coordinates, scanning row 0 left to right, then rows 1 and 2.
    pub fn empty_squares(&self) -> Vec<Coord> {
        Coord::ALL
            .iter()
            .copied()
            .filter(|coord| self.is_empty(*coord))
            .collect()
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|square| square.symbol())
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join("\n-+-+-\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
