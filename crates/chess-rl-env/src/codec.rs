//! Move↔Action and Board→Observation codecs

use chess_rl_core::{Observation, RLError, Result};
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

use crate::rules::ChessRules;
use crate::types::{square_from_index, ChessAction, ChessMove, Color, PieceType, Square};

/// Side length of the board grid
pub const BOARD_SIZE: usize = 8;
/// Largest magnitude in a piece configuration (king)
pub const MAX_PIECE_CODE: i8 = 6;

/// 8×8 signed piece grid. Row = rank (row 0 = rank 1), column = file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardObservation(pub Array2<i8>);

impl BoardObservation {
    /// Underlying grid
    #[must_use]
    pub fn grid(&self) -> &Array2<i8> {
        &self.0
    }
}

impl Observation for BoardObservation {
    fn to_vec(&self) -> Vec<f64> {
        self.0.iter().map(|v| f64::from(*v)).collect()
    }

    fn shape(&self) -> Vec<usize> {
        self.0.shape().to_vec()
    }
}

/// Encode a move as `(from, to, promotion or 0)`
#[must_use]
pub fn move_to_action(mv: &ChessMove) -> ChessAction {
    ChessAction::new(
        u32::from(mv.from.index()),
        u32::from(mv.to.index()),
        mv.promotion.map_or(0, |p| u32::from(p.code())),
    )
}

/// Decode an action into a candidate move.
///
/// Only the ranges are checked here; whether the move is legal is decided
/// by the rules engine when it is applied.
pub fn action_to_move(action: ChessAction) -> Result<ChessMove> {
    let from = square_from_index(action.from_square())?;
    let to = square_from_index(action.to_square())?;
    let promotion = match action.promotion() {
        0 => None,
        code => Some(PieceType::from_code(code).ok_or_else(|| {
            RLError::InvalidAction(format!("promotion code {code} out of range 0..=6"))
        })?),
    };
    Ok(ChessMove::new(from, to, promotion))
}

/// Raw piece configuration: `type * (-1)^color` per square, 0 when empty
pub fn piece_configuration<R: ChessRules>(board: &R) -> Array2<i8> {
    Array2::from_shape_fn((BOARD_SIZE, BOARD_SIZE), |(row, col)| {
        Square::from_coords(col as u8, row as u8)
            .and_then(|square| board.piece_at(square))
            .map_or(0, |piece| piece.signed_code())
    })
}

/// Orient a piece configuration for the side to move.
///
/// When Black is to move the grid is rotated 180°; the whole grid is then
/// multiplied by `(-1)^player`. The mover's pieces always come out positive
/// and on the low rows.
#[must_use]
pub fn canonicalize(state: &Array2<i8>, player: Color) -> Array2<i8> {
    let oriented = match player {
        Color::Black => state.slice(s![..;-1, ..;-1]).to_owned(),
        Color::White => state.clone(),
    };
    let sign = player.sign();
    oriented.mapv(|v| v * sign)
}

/// Canonical observation of a board
pub fn canonical_observation<R: ChessRules>(board: &R) -> BoardObservation {
    BoardObservation(canonicalize(&piece_configuration(board), board.turn()))
}
