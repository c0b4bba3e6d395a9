//! The chess environment

use std::cell::RefCell;

use chess_rl_core::{
    ActionSpace, AdversarialEnvironment, BoxObservationSpace, Environment, EnvironmentConfig,
    ObservationSpace, RenderMode, RenderOutput, Result, Reward, Step,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::action_space::ChessActionSpace;
use crate::codec::{self, BoardObservation, BOARD_SIZE, MAX_PIECE_CODE};
use crate::render::{image_to_array, BoardRenderer, RasterRenderer, TerminalViewer, Viewer};
use crate::rules::{ChessRules, ShakmatyRules};
use crate::types::{ChessAction, ChessStepInfo, Color, GameResult};

/// How observations are built from the board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationMode {
    /// Canonical 8×8 signed piece grid
    #[default]
    PieceMap,
}

/// How terminal results turn into rewards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardScheme {
    /// 1 for any finished game (win, loss or draw), 0 otherwise
    #[default]
    AnyTerminal,
    /// 1 when the move just played wins, -1 if it loses, 0 for draws
    Outcome,
}

impl RewardScheme {
    /// Reward for the player who just moved
    #[must_use]
    pub fn reward(self, result: Option<GameResult>, mover: Color) -> Reward {
        match (self, result) {
            (_, None) => Reward::ZERO,
            (Self::AnyTerminal, Some(_)) => Reward(1.0),
            (Self::Outcome, Some(result)) => match result.winner() {
                Some(winner) if winner == mover => Reward(1.0),
                Some(_) => Reward(-1.0),
                None => Reward::ZERO,
            },
        }
    }
}

/// Chess environment configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessEnvConfig {
    /// Width and height of rendered frames, in pixels
    pub render_size: u32,
    /// Observation encoding
    pub observation_mode: ObservationMode,
    /// Whether the fifty-move rule and threefold repetition end the game
    pub claim_draw: bool,
    /// Reward shaping for terminal results
    pub reward_scheme: RewardScheme,
    /// Seed for the action sampler; entropy when unset
    pub seed: Option<u64>,
    /// Width of the terminal viewer, in characters
    pub viewer_columns: u32,
}

impl Default for ChessEnvConfig {
    fn default() -> Self {
        Self {
            render_size: 512,
            observation_mode: ObservationMode::PieceMap,
            claim_draw: true,
            reward_scheme: RewardScheme::AnyTerminal,
            seed: None,
            viewer_columns: 64,
        }
    }
}

impl ChessEnvConfig {
    /// Build from the generic environment configuration.
    ///
    /// Chess settings are read from the flattened parameter map; the
    /// generic seed is used unless the map sets its own.
    pub fn from_env_config(config: &EnvironmentConfig) -> Result<Self> {
        let mut parsed: Self =
            serde_json::from_value(serde_json::Value::Object(config.params.clone()))?;
        if parsed.seed.is_none() {
            parsed.seed = config.seed;
        }
        Ok(parsed)
    }
}

type ViewerFactory = Box<dyn Fn(&ChessEnvConfig) -> Box<dyn Viewer>>;

fn stdout_viewer(config: &ChessEnvConfig) -> Box<dyn Viewer> {
    Box::new(TerminalViewer::stdout(config.viewer_columns))
}

/// Two-player chess behind the step/reset/render interface.
///
/// Not thread safe: the board, the sampler and the viewer are plain
/// mutable state.
pub struct ChessEnv<R = ShakmatyRules> {
    board: R,
    config: ChessEnvConfig,
    rng: RefCell<StdRng>,
    renderer: Box<dyn BoardRenderer>,
    viewer: Option<Box<dyn Viewer>>,
    viewer_factory: ViewerFactory,
}

impl ChessEnv<ShakmatyRules> {
    /// Create an environment on the standard starting position
    #[must_use]
    pub fn new(config: ChessEnvConfig) -> Self {
        Self::with_rules(config)
    }
}

impl Default for ChessEnv<ShakmatyRules> {
    fn default() -> Self {
        Self::new(ChessEnvConfig::default())
    }
}

impl<R: ChessRules> ChessEnv<R> {
    /// Create an environment over any rules engine
    #[must_use]
    pub fn with_rules(config: ChessEnvConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            board: R::starting_position(),
            config,
            rng: RefCell::new(rng),
            renderer: Box::new(RasterRenderer),
            viewer: None,
            viewer_factory: Box::new(stdout_viewer),
        }
    }

    /// Replace the renderer used for every render mode
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl BoardRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Replace how the `human` viewer is created
    #[must_use]
    pub fn with_viewer_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ChessEnvConfig) -> Box<dyn Viewer> + 'static,
    {
        self.viewer_factory = Box::new(factory);
        self
    }

    /// Current board
    #[must_use]
    pub fn board(&self) -> &R {
        &self.board
    }

    /// Legal-action view over the current board
    #[must_use]
    pub fn chess_action_space(&self) -> ChessActionSpace<'_, R> {
        ChessActionSpace::new(&self.board, &self.rng)
    }

    /// Raw piece configuration of the current board
    #[must_use]
    pub fn piece_configuration(&self) -> ndarray::Array2<i8> {
        codec::piece_configuration(&self.board)
    }

    /// Whether a viewer is currently held
    #[must_use]
    pub fn has_viewer(&self) -> bool {
        self.viewer.is_some()
    }

    fn step_info(&self) -> ChessStepInfo {
        ChessStepInfo {
            player: self.board.turn(),
            castling_rights: self.board.castling_rights(),
            fullmove_number: self.board.fullmove_number(),
            halfmove_clock: self.board.halfmove_clock(),
            promoted: self.board.promoted(),
            ep_square: self.board.ep_square(),
        }
    }

    fn observe(&self) -> BoardObservation {
        match self.config.observation_mode {
            ObservationMode::PieceMap => codec::canonical_observation(&self.board),
        }
    }
}

impl<R: ChessRules> Environment for ChessEnv<R> {
    type Observation = BoardObservation;
    type Action = ChessAction;
    type Info = ChessStepInfo;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = BoardObservation> + '_> {
        Box::new(BoxObservationSpace::<BoardObservation>::symmetric(
            f64::from(MAX_PIECE_CODE),
            vec![BOARD_SIZE, BOARD_SIZE],
        ))
    }

    fn action_space(&self) -> Box<dyn ActionSpace<Action = ChessAction> + '_> {
        Box::new(self.chess_action_space())
    }

    fn reset(&mut self) -> Result<BoardObservation> {
        self.board = R::starting_position();
        info!("reset to starting position");
        Ok(self.observe())
    }

    fn step(&mut self, action: ChessAction) -> Result<Step<BoardObservation, ChessStepInfo>> {
        let mv = codec::action_to_move(action)?;
        let mover = self.board.turn();
        self.board.push(&mv)?;

        let observation = self.observe();
        let result = self.game_result();
        let reward = self.config.reward_scheme.reward(result, mover);
        let done = result.is_some();
        debug!(%mv, ?result, "step");
        if let Some(result) = result {
            info!(%result, fen = %self.board.fen(), "game over");
        }

        Ok(Step {
            observation,
            reward,
            done,
            info: self.step_info(),
        })
    }

    fn render(&mut self, mode: RenderMode) -> Result<RenderOutput> {
        let image = self
            .renderer
            .render(&self.piece_configuration(), self.config.render_size)?;
        let frame = image_to_array(image)?;

        match mode {
            RenderMode::RgbArray => Ok(RenderOutput::RgbArray(frame)),
            RenderMode::Human => {
                let config = &self.config;
                let factory = &self.viewer_factory;
                let viewer = self.viewer.get_or_insert_with(|| factory(config));
                viewer.imshow(&frame)?;
                Ok(RenderOutput::Human(viewer.is_open()))
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut viewer) = self.viewer.take() {
            viewer.close()?;
        }
        Ok(())
    }
}

impl<R: ChessRules> AdversarialEnvironment for ChessEnv<R> {
    type Player = Color;
    type Outcome = GameResult;

    fn current_player(&self) -> Color {
        self.board.turn()
    }

    fn previous_player(&self) -> Color {
        self.board.turn().other()
    }

    fn string_representation(&self) -> String {
        self.board.fen()
    }

    fn set_string_representation(&mut self, repr: &str) -> Result<()> {
        self.board = R::from_fen(repr)?;
        info!(fen = %repr, "loaded position");
        Ok(())
    }

    fn canonical_observation(&self) -> BoardObservation {
        codec::canonical_observation(&self.board)
    }

    fn game_result(&self) -> Option<GameResult> {
        self.board.outcome(self.config.claim_draw)
    }
}

impl<R> Drop for ChessEnv<R> {
    fn drop(&mut self) {
        if let Some(mut viewer) = self.viewer.take() {
            if let Err(e) = viewer.close() {
                warn!(error = %e, "failed to close viewer");
            }
        }
    }
}
