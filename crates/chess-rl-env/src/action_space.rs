//! Legal-action view over a board

use std::cell::RefCell;

use chess_rl_core::{ActionSpace, RLError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::codec::move_to_action;
use crate::rules::ChessRules;
use crate::types::ChessAction;

/// Actions legal on the board this space borrows.
///
/// The space holds a reference, not a copy, so it always reflects the
/// board it was created from; the environment hands out a fresh one per
/// call and a replaced board can never be enumerated through a stale view.
pub struct ChessActionSpace<'a, R> {
    board: &'a R,
    rng: &'a RefCell<StdRng>,
}

impl<'a, R: ChessRules> ChessActionSpace<'a, R> {
    /// Bind a space to a board and the sampler's random source
    pub fn new(board: &'a R, rng: &'a RefCell<StdRng>) -> Self {
        Self { board, rng }
    }

    /// Sample a legal action using the given random source
    pub fn sample_with<G: Rng + ?Sized>(&self, rng: &mut G) -> Result<ChessAction> {
        self.board
            .legal_moves()
            .choose(rng)
            .map(move_to_action)
            .ok_or_else(|| RLError::Environment("cannot sample from a position with no legal moves".into()))
    }
}

impl<R: ChessRules> ActionSpace for ChessActionSpace<'_, R> {
    type Action = ChessAction;

    fn sample(&self) -> Result<ChessAction> {
        let mut rng = self.rng.borrow_mut();
        self.sample_with(&mut *rng)
    }

    fn legal_actions(&self) -> Vec<ChessAction> {
        self.board.legal_moves().iter().map(move_to_action).collect()
    }

    fn dim(&self) -> Option<usize> {
        Some(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ShakmatyRules;
    use rand::SeedableRng;

    #[test]
    fn test_starting_actions() {
        let board = ShakmatyRules::starting_position();
        let rng = RefCell::new(StdRng::seed_from_u64(0));
        let space = ChessActionSpace::new(&board, &rng);

        let actions = space.legal_actions();
        assert_eq!(actions.len(), 20);
        assert!(space.contains(&ChessAction::new(12, 28, 0)));
        assert!(!space.contains(&ChessAction::new(12, 36, 0)));
        assert!(actions.iter().all(|a| a.promotion() == 0));
        assert_eq!(space.dim(), Some(3));
    }

    #[test]
    fn test_sample_is_legal_and_seeded() {
        let board = ShakmatyRules::starting_position();
        let first = RefCell::new(StdRng::seed_from_u64(42));
        let second = RefCell::new(StdRng::seed_from_u64(42));
        let a = ChessActionSpace::new(&board, &first);
        let b = ChessActionSpace::new(&board, &second);

        for _ in 0..10 {
            let action = a.sample().unwrap();
            assert!(a.contains(&action));
            assert_eq!(action, b.sample().unwrap());
        }
    }

    #[test]
    fn test_sample_without_moves_fails() {
        // black is checkmated
        let board = ShakmatyRules::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let rng = RefCell::new(StdRng::seed_from_u64(0));
        let space = ChessActionSpace::new(&board, &rng);
        assert!(space.legal_actions().is_empty());
        assert!(matches!(space.sample(), Err(RLError::Environment(_))));
    }
}
