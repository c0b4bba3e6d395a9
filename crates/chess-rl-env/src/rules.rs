//! Rules engine capability interface and its `shakmaty` implementation
//!
//! The environment never touches a chess library directly. Everything it
//! needs from the rules (move generation, move application, occupancy and
//! metadata queries, FEN round trips and result detection) goes through
//! [`ChessRules`], so any conformant implementation can be swapped in.

use std::fmt;

use chess_rl_core::{RLError, Result};
use shakmaty::fen::Fen;
use shakmaty::uci::Uci;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Position, PositionError, Role};
use tracing::debug;

use crate::types::{ChessMove, Color, GameResult, Piece, PieceType, Square};

/// Half-moves after which the game is drawn without a claim
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;
/// Half-moves after which a draw may be claimed
const FIFTY_MOVE_PLIES: u32 = 100;

/// Capabilities the environment requires from a chess rules engine
pub trait ChessRules: Clone + fmt::Debug {
    /// Standard starting position
    fn starting_position() -> Self
    where
        Self: Sized;

    /// Position parsed from FEN. The string is trusted as given.
    fn from_fen(fen: &str) -> Result<Self>
    where
        Self: Sized;

    /// Current position as FEN
    fn fen(&self) -> String;

    /// Legal moves in engine enumeration order
    fn legal_moves(&self) -> Vec<ChessMove>;

    /// Apply a move, failing if it is not legal in the current position
    fn push(&mut self, mv: &ChessMove) -> Result<()>;

    /// Side to move
    fn turn(&self) -> Color;

    /// Piece standing on a square
    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Bitmask of rook squares that still carry castling rights
    fn castling_rights(&self) -> u64;

    /// Half-moves since the last capture or pawn move
    fn halfmove_clock(&self) -> u32;

    /// Full-move number, starting at 1
    fn fullmove_number(&self) -> u32;

    /// Square skipped by the last double pawn push, if any
    fn ep_square(&self) -> Option<Square>;

    /// Bitmask of squares holding promoted pieces
    fn promoted(&self) -> u64;

    /// Game result, `None` while the game continues.
    ///
    /// With `claim_draw` the game also ends once the side to move could
    /// claim a draw under the fifty-move rule or threefold repetition,
    /// either in the current position or by announcing its next move.
    fn outcome(&self, claim_draw: bool) -> Option<GameResult>;
}

/// [`ChessRules`] backed by `shakmaty`
#[derive(Clone)]
pub struct ShakmatyRules {
    pos: Chess,
    /// Repetition keys of every position since the last load, current last
    history: Vec<String>,
    promoted: u64,
}

impl ShakmatyRules {
    fn from_position(pos: Chess) -> Self {
        let mut rules = Self {
            pos,
            history: Vec::new(),
            promoted: 0,
        };
        rules.history.push(rules.repetition_key());
        rules
    }

    fn repetition_key(&self) -> String {
        position_key(&self.pos)
    }

    fn occurrences(&self, key: &str) -> usize {
        self.history.iter().filter(|seen| *seen == key).count()
    }

    fn repetitions(&self) -> usize {
        self.history.last().map_or(0, |current| self.occurrences(current))
    }

    fn can_claim_fifty_moves(&self) -> bool {
        let halfmoves = self.pos.halfmoves();
        halfmoves >= FIFTY_MOVE_PLIES
            || (halfmoves + 1 >= FIFTY_MOVE_PLIES
                && self.pos.legal_moves().iter().any(|m| !m.is_zeroing()))
    }

    fn can_claim_threefold_repetition(&self) -> bool {
        if self.repetitions() >= 3 {
            return true;
        }
        // a move reaching a position already seen twice may be announced
        self.pos.legal_moves().iter().any(|m| {
            let mut next = self.pos.clone();
            next.play_unchecked(m);
            self.occurrences(&position_key(&next)) >= 2
        })
    }

    fn to_uci(mv: &ChessMove) -> Uci {
        Uci::Normal {
            from: to_shakmaty_square(mv.from),
            to: to_shakmaty_square(mv.to),
            promotion: mv.promotion.map(to_role),
        }
    }
}

impl fmt::Debug for ShakmatyRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShakmatyRules")
            .field("fen", &self.fen())
            .field("plies", &self.history.len().saturating_sub(1))
            .finish()
    }
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        Self::starting_position()
    }
}

impl ChessRules for ShakmatyRules {
    fn starting_position() -> Self {
        Self::from_position(Chess::default())
    }

    fn from_fen(fen: &str) -> Result<Self> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e| RLError::InvalidState(format!("invalid FEN {fen:?}: {e}")))?;
        // stale castling flags and unreachable en passant targets are dropped
        let pos: Chess = parsed
            .into_position(CastlingMode::Standard)
            .or_else(PositionError::ignore_invalid_castling_rights)
            .or_else(PositionError::ignore_invalid_ep_square)
            .or_else(PositionError::ignore_too_much_material)
            .or_else(PositionError::ignore_impossible_check)
            .map_err(|e| RLError::InvalidState(format!("illegal position {fen:?}: {e}")))?;
        Ok(Self::from_position(pos))
    }

    fn fen(&self) -> String {
        Fen::from_position(self.pos.clone(), EnPassantMode::Legal).to_string()
    }

    fn legal_moves(&self) -> Vec<ChessMove> {
        self.pos
            .legal_moves()
            .iter()
            .filter_map(|m| match Uci::from_move(m, CastlingMode::Standard) {
                Uci::Normal { from, to, promotion } => Some(ChessMove::new(
                    from_shakmaty_square(from),
                    from_shakmaty_square(to),
                    promotion.map(from_role),
                )),
                // drops and null moves do not occur in standard chess
                _ => None,
            })
            .collect()
    }

    fn push(&mut self, mv: &ChessMove) -> Result<()> {
        let m = Self::to_uci(mv)
            .to_move(&self.pos)
            .map_err(|e| RLError::InvalidAction(format!("{mv} is not legal here: {e}")))?;

        let carried = self.promoted & mv.from.bit() != 0 || mv.promotion.is_some();
        self.promoted &= !(mv.from.bit() | mv.to.bit());
        if carried {
            self.promoted |= mv.to.bit();
        }

        self.pos.play_unchecked(&m);
        let key = self.repetition_key();
        debug!(mv = %mv, position = %key, "pushed move");
        self.history.push(key);
        Ok(())
    }

    fn turn(&self) -> Color {
        from_shakmaty_color(self.pos.turn())
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.pos
            .board()
            .piece_at(to_shakmaty_square(square))
            .map(|p| Piece {
                color: from_shakmaty_color(p.color),
                piece_type: from_role(p.role),
            })
    }

    fn castling_rights(&self) -> u64 {
        self.pos.castles().castling_rights().0
    }

    fn halfmove_clock(&self) -> u32 {
        self.pos.halfmoves()
    }

    fn fullmove_number(&self) -> u32 {
        self.pos.fullmoves().get()
    }

    fn ep_square(&self) -> Option<Square> {
        self.pos
            .ep_square(EnPassantMode::Always)
            .map(from_shakmaty_square)
    }

    fn promoted(&self) -> u64 {
        self.promoted
    }

    fn outcome(&self, claim_draw: bool) -> Option<GameResult> {
        if self.pos.is_checkmate() {
            return Some(GameResult::win_for(self.turn().other()));
        }
        if self.pos.is_stalemate() || self.pos.is_insufficient_material() {
            return Some(GameResult::Draw);
        }
        if self.pos.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES || self.repetitions() >= 5 {
            return Some(GameResult::Draw);
        }
        if claim_draw && (self.can_claim_fifty_moves() || self.can_claim_threefold_repetition()) {
            return Some(GameResult::Draw);
        }
        None
    }
}

/// FEN without the move counters: placement, turn, castling, en passant
fn position_key(pos: &Chess) -> String {
    let fen = Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string();
    fen.split(' ').take(4).collect::<Vec<_>>().join(" ")
}

fn to_shakmaty_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::new(u32::from(square.index()))
}

fn from_shakmaty_square(square: shakmaty::Square) -> Square {
    Square::ALL[square as usize]
}

fn from_shakmaty_color(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn to_role(piece_type: PieceType) -> Role {
    match piece_type {
        PieceType::Pawn => Role::Pawn,
        PieceType::Knight => Role::Knight,
        PieceType::Bishop => Role::Bishop,
        PieceType::Rook => Role::Rook,
        PieceType::Queen => Role::Queen,
        PieceType::King => Role::King,
    }
}

fn from_role(role: Role) -> PieceType {
    match role {
        Role::Pawn => PieceType::Pawn,
        Role::Knight => PieceType::Knight,
        Role::Bishop => PieceType::Bishop,
        Role::Rook => PieceType::Rook,
        Role::Queen => PieceType::Queen,
        Role::King => PieceType::King,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn mv(from: u32, to: u32, promotion: Option<PieceType>) -> ChessMove {
        ChessMove::new(Square::new(from).unwrap(), Square::new(to).unwrap(), promotion)
    }

    #[test]
    fn test_starting_position() {
        let rules = ShakmatyRules::starting_position();
        assert_eq!(rules.fen(), START_FEN);
        assert_eq!(rules.legal_moves().len(), 20);
        assert_eq!(rules.turn(), Color::White);
        assert_eq!(rules.castling_rights(), 1 | 1 << 7 | 1 << 56 | 1 << 63);
        assert_eq!(rules.fullmove_number(), 1);
        assert_eq!(rules.halfmove_clock(), 0);
        assert_eq!(rules.outcome(true), None);
        assert_eq!(
            rules.piece_at(Square::new(4).unwrap()),
            Some(Piece { color: Color::White, piece_type: PieceType::King })
        );
        assert_eq!(rules.piece_at(Square::new(28).unwrap()), None);
    }

    #[test]
    fn test_double_push_sets_ep_square() {
        let mut rules = ShakmatyRules::starting_position();
        rules.push(&mv(12, 28, None)).unwrap();
        assert_eq!(rules.ep_square(), Square::new(20));
        // no black pawn can capture, so the FEN omits the target
        assert_eq!(rules.fen(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        rules.push(&mv(57, 42, None)).unwrap();
        assert_eq!(rules.ep_square(), None);
    }

    #[test]
    fn test_illegal_move_rejected() {
        let mut rules = ShakmatyRules::starting_position();
        let err = rules.push(&mv(12, 36, None)).unwrap_err();
        assert!(matches!(err, RLError::InvalidAction(_)));
        assert_eq!(rules.fen(), START_FEN);
    }

    #[test]
    fn test_invalid_fen_rejected() {
        assert!(matches!(
            ShakmatyRules::from_fen("not a position"),
            Err(RLError::InvalidState(_))
        ));
    }

    #[test]
    fn test_castling_encodes_king_destination() {
        let rules = ShakmatyRules::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = rules.legal_moves();
        assert!(moves.contains(&mv(4, 6, None)));
        assert!(moves.contains(&mv(4, 2, None)));

        let mut rules = rules;
        rules.push(&mv(4, 6, None)).unwrap();
        assert_eq!(
            rules.piece_at(Square::new(5).unwrap()).map(|p| p.piece_type),
            Some(PieceType::Rook)
        );
        assert_eq!(rules.castling_rights(), 1 << 56 | 1 << 63);
    }

    #[test]
    fn test_promotion_tracking() {
        let mut rules = ShakmatyRules::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        rules.push(&mv(48, 56, Some(PieceType::Queen))).unwrap();
        assert_eq!(rules.promoted(), 1 << 56);
        rules.push(&mv(55, 47, None)).unwrap();
        rules.push(&mv(56, 57, None)).unwrap();
        assert_eq!(rules.promoted(), 1 << 57);
    }

    #[test]
    fn test_threefold_repetition_needs_claim() {
        let mut rules = ShakmatyRules::starting_position();
        // knights out and back twice
        for _ in 0..2 {
            for (from, to) in [(6, 21), (62, 45), (21, 6), (45, 62)] {
                rules.push(&mv(from, to, None)).unwrap();
            }
        }
        assert_eq!(rules.outcome(false), None);
        assert_eq!(rules.outcome(true), Some(GameResult::Draw));
    }

    #[test]
    fn test_threefold_claim_by_announced_move() {
        let mut rules = ShakmatyRules::starting_position();
        let shuffle = [(6, 21), (62, 45), (21, 6), (45, 62), (6, 21), (62, 45), (21, 6)];
        for (ply, (from, to)) in shuffle.into_iter().enumerate() {
            rules.push(&mv(from, to, None)).unwrap();
            // Ng8 next would bring the start position back a third time
            let claimable = ply == shuffle.len() - 1;
            assert_eq!(rules.outcome(true).is_some(), claimable, "ply {ply}");
        }
        assert_eq!(rules.outcome(false), None);
    }

    #[test]
    fn test_fifty_move_rule() {
        let rules = ShakmatyRules::from_fen("7k/8/8/8/8/8/8/KR6 w - - 100 80").unwrap();
        assert_eq!(rules.outcome(false), None);
        assert_eq!(rules.outcome(true), Some(GameResult::Draw));

        let rules = ShakmatyRules::from_fen("7k/8/8/8/8/8/8/KR6 w - - 150 80").unwrap();
        assert_eq!(rules.outcome(false), Some(GameResult::Draw));
    }

    #[test]
    fn test_fifty_move_claim_by_announced_move() {
        let rules = ShakmatyRules::from_fen("7k/8/8/8/8/8/8/KR6 w - - 99 80").unwrap();
        assert_eq!(rules.outcome(false), None);
        assert_eq!(rules.outcome(true), Some(GameResult::Draw));

        let rules = ShakmatyRules::from_fen("7k/8/8/8/8/8/8/KR6 w - - 98 80").unwrap();
        assert_eq!(rules.outcome(true), None);
    }

    #[test]
    fn test_loose_fen_fields_are_dropped() {
        // h8 rook is gone but the black short castling flag remains
        let rules =
            ShakmatyRules::from_fen("rnbqkbn1/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
                .unwrap();
        assert_eq!(rules.castling_rights(), 1 | 1 << 7 | 1 << 56);

        // no double push could have produced e6
        let rules =
            ShakmatyRules::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e6 0 1")
                .unwrap();
        assert_eq!(rules.ep_square(), None);
        assert_eq!(rules.fen(), START_FEN);
    }

    #[test]
    fn test_insufficient_material() {
        let rules = ShakmatyRules::from_fen("7k/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        assert_eq!(rules.outcome(false), Some(GameResult::Draw));
    }
}
