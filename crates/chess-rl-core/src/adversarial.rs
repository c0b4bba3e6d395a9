//! Two-player, turn-based environments

use crate::Environment;

/// An environment in which two players alternate moves.
///
/// Observations are expected to be canonical: presented from the point of
/// view of the player to move, so a single policy can play either side.
pub trait AdversarialEnvironment: Environment {
    /// Player identifier
    type Player: Copy + Eq + std::fmt::Debug;
    /// Final game result
    type Outcome: Copy + Eq + std::fmt::Debug;

    /// Player to move
    fn current_player(&self) -> Self::Player;

    /// Player who made the last move
    fn previous_player(&self) -> Self::Player;

    /// Serialize the full game state to a string
    fn string_representation(&self) -> String;

    /// Replace the game state with one parsed from a string
    fn set_string_representation(&mut self, repr: &str) -> crate::Result<()>;

    /// Observation of the current state from the mover's point of view
    fn canonical_observation(&self) -> Self::Observation;

    /// Result of the game, `None` while it is still running
    fn game_result(&self) -> Option<Self::Outcome>;

    /// Every currently legal action
    fn legal_actions(&self) -> Vec<Self::Action> {
        self.action_space().legal_actions()
    }
}
