//! Chess domain types shared by the codecs, the rules adapter and the environment

use std::fmt;

use chess_rl_core::{Action, RLError, Result};
use serde::{Deserialize, Serialize};

/// Side of the board.
///
/// White encodes as 1 and Black as 0, so `(-1)^color` is negative for White.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// Moves first
    White,
    /// Moves second; observations are rotated when Black is to move
    Black,
}

impl Color {
    /// `(-1)^color`
    #[must_use]
    pub fn sign(self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    /// The other side
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

/// Piece kind, numbered pawn = 1 through king = 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum PieceType {
    /// Pawn
    Pawn = 1,
    /// Knight
    Knight = 2,
    /// Bishop
    Bishop = 3,
    /// Rook
    Rook = 4,
    /// Queen
    Queen = 5,
    /// King
    King = 6,
}

impl PieceType {
    /// Numeric code, 1..=6
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Piece type for a numeric code, `None` outside 1..=6
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Self::Pawn),
            2 => Some(Self::Knight),
            3 => Some(Self::Bishop),
            4 => Some(Self::Rook),
            5 => Some(Self::Queen),
            6 => Some(Self::King),
            _ => None,
        }
    }
}

/// A colored piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// Owner
    pub color: Color,
    /// Kind
    pub piece_type: PieceType,
}

impl Piece {
    /// Signed code used in piece configurations: `type * (-1)^color`
    #[must_use]
    pub fn signed_code(self) -> i8 {
        // piece codes are 1..=6, always representable
        self.piece_type.code() as i8 * self.color.sign()
    }
}

/// Board square, a1 = 0, b1 = 1, ..., h8 = 63
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square(u8);

impl Square {
    /// Every square in index order
    pub const ALL: [Self; 64] = {
        let mut squares = [Self(0); 64];
        let mut i = 0;
        while i < 64 {
            squares[i] = Self(i as u8);
            i += 1;
        }
        squares
    };

    /// Square for an index, `None` outside 0..=63
    #[must_use]
    pub fn new(index: u32) -> Option<Self> {
        u8::try_from(index).ok().filter(|i| *i < 64).map(Self)
    }

    /// Square at a file (0 = a) and rank (0 = 1st)
    #[must_use]
    pub fn from_coords(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then(|| Self(rank * 8 + file))
    }

    /// Index 0..=63
    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    /// File, 0 = a
    #[must_use]
    pub fn file(self) -> u8 {
        self.0 % 8
    }

    /// Rank, 0 = 1st
    #[must_use]
    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Single-bit mask for bitboard style fields
    #[must_use]
    pub fn bit(self) -> u64 {
        1 << self.0
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", char::from(b'a' + self.file()), self.rank() + 1)
    }
}

/// A move in the rules engine vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChessMove {
    /// Origin square (the king's square for castling)
    pub from: Square,
    /// Destination square (the king's destination for castling)
    pub to: Square,
    /// Piece a pawn promotes to
    pub promotion: Option<PieceType>,
}

impl ChessMove {
    /// Create a move
    #[must_use]
    pub fn new(from: Square, to: Square, promotion: Option<PieceType>) -> Self {
        Self { from, to, promotion }
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            let c = match promotion {
                PieceType::Pawn => 'p',
                PieceType::Knight => 'n',
                PieceType::Bishop => 'b',
                PieceType::Rook => 'r',
                PieceType::Queen => 'q',
                PieceType::King => 'k',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Fixed-shape action: `(from_square, to_square, promotion_piece_type)`.
///
/// Promotion is 0 for ordinary moves. Values are not range checked until
/// the action is decoded into a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChessAction(pub [u32; 3]);

impl ChessAction {
    /// Create an action from its three components
    #[must_use]
    pub fn new(from: u32, to: u32, promotion: u32) -> Self {
        Self([from, to, promotion])
    }

    /// Origin square index
    #[must_use]
    pub fn from_square(&self) -> u32 {
        self.0[0]
    }

    /// Destination square index
    #[must_use]
    pub fn to_square(&self) -> u32 {
        self.0[1]
    }

    /// Promotion piece code, 0 for none
    #[must_use]
    pub fn promotion(&self) -> u32 {
        self.0[2]
    }
}

impl From<[u32; 3]> for ChessAction {
    fn from(raw: [u32; 3]) -> Self {
        Self(raw)
    }
}

impl From<ChessAction> for [u32; 3] {
    fn from(action: ChessAction) -> Self {
        action.0
    }
}

impl Action for ChessAction {
    fn to_vec(&self) -> Vec<f64> {
        self.0.iter().map(|v| f64::from(*v)).collect()
    }
}

/// Final result of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// White won
    WhiteWins,
    /// Black won
    BlackWins,
    /// Drawn by any rule
    Draw,
}

impl GameResult {
    /// Winning side, `None` for a draw
    #[must_use]
    pub fn winner(self) -> Option<Color> {
        match self {
            Self::WhiteWins => Some(Color::White),
            Self::BlackWins => Some(Color::Black),
            Self::Draw => None,
        }
    }

    /// Win for the given side
    #[must_use]
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => Self::WhiteWins,
            Color::Black => Self::BlackWins,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
        })
    }
}

/// Metadata returned with every step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessStepInfo {
    /// Side to move after the step
    pub player: Color,
    /// Rook squares that still carry castling rights
    pub castling_rights: u64,
    /// Full-move number
    pub fullmove_number: u32,
    /// Half-moves since the last capture or pawn move
    pub halfmove_clock: u32,
    /// Squares holding promoted pieces
    pub promoted: u64,
    /// Square a pawn just skipped over with a double push
    pub ep_square: Option<Square>,
}

pub(crate) fn square_from_index(index: u32) -> Result<Square> {
    Square::new(index).ok_or_else(|| RLError::InvalidAction(format!("square {index} out of range 0..=63")))
}
