//! Core reinforcement learning traits and types for board game environments
//!
//! This crate provides the environment-agnostic abstractions shared by the
//! game environments: the step/reset/render lifecycle, action and
//! observation spaces, and the two-player (adversarial) contract.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod adversarial;
pub mod environment;
pub mod error;
pub mod observation;
pub mod render;
pub mod reward;

// Re-export core traits and types
pub use action::{Action, ActionSpace};
pub use adversarial::AdversarialEnvironment;
pub use environment::{Environment, EnvironmentConfig, Episode, Step, TrackedEnvironment};
pub use error::{RLError, Result};
pub use observation::{BoxObservationSpace, Observation, ObservationSpace};
pub use render::{RenderMode, RenderOutput};
pub use reward::Reward;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Action, ActionSpace, AdversarialEnvironment, Environment, Observation,
        ObservationSpace, RenderMode, RenderOutput, Result, Reward, Step,
    };
}
