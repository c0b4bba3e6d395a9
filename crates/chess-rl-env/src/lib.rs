//! Two-player chess reinforcement learning environment
//!
//! Wraps a chess rules engine behind the step/reset/render lifecycle:
//! - [`codec`] maps boards to canonical 8×8 observations and moves to
//!   fixed `(from, to, promotion)` actions and back
//! - [`action_space`] enumerates and samples legal actions
//! - [`env`] owns the board and the game lifecycle
//! - [`rules`] is the rules engine seam, with a `shakmaty` implementation
//! - [`render`] rasterizes boards and shows them in a terminal viewer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

pub mod action_space;
pub mod codec;
pub mod env;
pub mod render;
pub mod rules;
pub mod types;

pub use action_space::ChessActionSpace;
pub use codec::{action_to_move, canonical_observation, move_to_action, piece_configuration, BoardObservation};
pub use env::{ChessEnv, ChessEnvConfig, ObservationMode, RewardScheme};
pub use render::{BoardRenderer, RasterRenderer, TerminalViewer, Viewer};
pub use rules::{ChessRules, ShakmatyRules};
pub use types::{ChessAction, ChessMove, ChessStepInfo, Color, GameResult, Piece, PieceType, Square};

// Re-export core types
pub use chess_rl_core::{
    ActionSpace, AdversarialEnvironment, Environment, Observation, ObservationSpace, RLError,
    RenderMode, RenderOutput, Result, Reward, Step, TrackedEnvironment,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{ChessAction, ChessEnv, ChessEnvConfig, Color, GameResult};
    pub use chess_rl_core::prelude::*;
}
