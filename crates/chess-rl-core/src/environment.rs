//! Environment traits and types

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Action, ActionSpace, Observation, ObservationSpace, RenderMode, RenderOutput, Reward};

/// Result of a single environment step
#[derive(Debug, Clone)]
pub struct Step<O, I> {
    /// Observation from the environment
    pub observation: O,
    /// Reward signal
    pub reward: Reward,
    /// Whether the episode is done
    pub done: bool,
    /// Additional info from the environment
    pub info: I,
}

/// Episode information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Episode ID
    pub id: String,
    /// Total reward
    pub total_reward: f64,
    /// Number of steps
    pub steps: usize,
    /// Start time
    pub start_time: chrono::DateTime<chrono::Utc>,
    /// End time
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Configuration shared by all environments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Random seed
    pub seed: Option<u64>,
    /// Render mode
    pub render_mode: Option<RenderMode>,
    /// Environment specific parameters
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Core environment trait
///
/// Environments are synchronous and not internally synchronized; callers
/// that share one across threads must serialize access themselves.
pub trait Environment {
    /// Observation type
    type Observation: Observation;
    /// Action type
    type Action: Action;
    /// Per-step metadata type
    type Info: std::fmt::Debug;

    /// Get the observation space
    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation> + '_>;

    /// Get the action space bound to the current state
    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action> + '_>;

    /// Reset the environment and return the first observation
    fn reset(&mut self) -> crate::Result<Self::Observation>;

    /// Take a step in the environment
    fn step(&mut self, action: Self::Action) -> crate::Result<Step<Self::Observation, Self::Info>>;

    /// Render the environment
    fn render(&mut self, mode: RenderMode) -> crate::Result<RenderOutput> {
        Err(crate::RLError::UnsupportedRenderMode(mode.to_string()))
    }

    /// Close the environment and release any display resources
    fn close(&mut self) -> crate::Result<()> {
        Ok(())
    }

    /// Get current episode info
    fn episode_info(&self) -> Option<Episode> {
        None
    }
}

/// Wrapper for environments that tracks episodes
pub struct TrackedEnvironment<E> {
    /// Inner environment
    pub env: E,
    /// Current episode
    pub episode: Option<Episode>,
    /// Step counter
    pub step_count: usize,
}

impl<E> TrackedEnvironment<E> {
    /// Create a new tracked environment
    pub fn new(env: E) -> Self {
        Self {
            env,
            episode: None,
            step_count: 0,
        }
    }
}

impl<E> Environment for TrackedEnvironment<E>
where
    E: Environment,
{
    type Observation = E::Observation;
    type Action = E::Action;
    type Info = E::Info;

    fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Self::Observation> + '_> {
        self.env.observation_space()
    }

    fn action_space(&self) -> Box<dyn ActionSpace<Action = Self::Action> + '_> {
        self.env.action_space()
    }

    fn reset(&mut self) -> crate::Result<Self::Observation> {
        // End current episode if exists
        if let Some(ref mut episode) = self.episode {
            if episode.end_time.is_none() {
                episode.end_time = Some(chrono::Utc::now());
            }
        }

        let episode = Episode {
            id: uuid::Uuid::new_v4().to_string(),
            total_reward: 0.0,
            steps: 0,
            start_time: chrono::Utc::now(),
            end_time: None,
        };
        info!(episode = %episode.id, "starting episode");
        self.episode = Some(episode);
        self.step_count = 0;

        self.env.reset()
    }

    fn step(&mut self, action: Self::Action) -> crate::Result<Step<Self::Observation, Self::Info>> {
        let step = self.env.step(action)?;

        self.step_count += 1;
        if let Some(ref mut episode) = self.episode {
            episode.total_reward += step.reward.0;
            episode.steps = self.step_count;

            if step.done {
                episode.end_time = Some(chrono::Utc::now());
                info!(
                    episode = %episode.id,
                    steps = episode.steps,
                    total_reward = episode.total_reward,
                    "episode finished"
                );
            }
        }

        Ok(step)
    }

    fn render(&mut self, mode: RenderMode) -> crate::Result<RenderOutput> {
        self.env.render(mode)
    }

    fn close(&mut self) -> crate::Result<()> {
        self.env.close()
    }

    fn episode_info(&self) -> Option<Episode> {
        self.episode.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoxObservationSpace;

    #[derive(Debug, Clone, PartialEq)]
    struct Count(u32);

    impl Action for Count {
        fn to_vec(&self) -> Vec<f64> {
            vec![f64::from(self.0)]
        }
    }

    impl Observation for Count {
        fn to_vec(&self) -> Vec<f64> {
            vec![f64::from(self.0)]
        }

        fn shape(&self) -> Vec<usize> {
            vec![1]
        }
    }

    struct CountSpace;

    impl ActionSpace for CountSpace {
        type Action = Count;

        fn sample(&self) -> crate::Result<Count> {
            Ok(Count(1))
        }

        fn legal_actions(&self) -> Vec<Count> {
            vec![Count(1)]
        }

        fn dim(&self) -> Option<usize> {
            Some(1)
        }
    }

    /// Counts up to three, one reward per step.
    struct Counter(u32);

    impl Environment for Counter {
        type Observation = Count;
        type Action = Count;
        type Info = ();

        fn observation_space(&self) -> Box<dyn ObservationSpace<Observation = Count> + '_> {
            Box::new(BoxObservationSpace::new(0.0, 3.0, vec![1]).unwrap())
        }

        fn action_space(&self) -> Box<dyn ActionSpace<Action = Count> + '_> {
            Box::new(CountSpace)
        }

        fn reset(&mut self) -> crate::Result<Count> {
            self.0 = 0;
            Ok(Count(0))
        }

        fn step(&mut self, action: Count) -> crate::Result<Step<Count, ()>> {
            self.0 += action.0;
            Ok(Step {
                observation: Count(self.0),
                reward: Reward(1.0),
                done: self.0 >= 3,
                info: (),
            })
        }
    }

    #[test]
    fn test_tracked_episode() {
        let mut env = TrackedEnvironment::new(Counter(0));
        assert!(env.episode_info().is_none());

        env.reset().unwrap();
        let first_id = env.episode_info().unwrap().id;

        loop {
            let action = env.action_space().sample().unwrap();
            if env.step(action).unwrap().done {
                break;
            }
        }

        let episode = env.episode_info().unwrap();
        assert_eq!(episode.steps, 3);
        assert_eq!(episode.total_reward, 3.0);
        assert!(episode.end_time.is_some());

        env.reset().unwrap();
        assert_ne!(env.episode_info().unwrap().id, first_id);
        assert_eq!(env.step_count, 0);
    }

    #[test]
    fn test_default_render_is_unsupported() {
        let mut env = Counter(0);
        assert!(env.render(RenderMode::RgbArray).is_err());
        assert!(env.close().is_ok());
    }

    #[test]
    fn test_config_flattens_params() {
        let config: EnvironmentConfig =
            serde_json::from_str(r#"{"seed": 7, "render_mode": "human", "render_size": 256}"#)
                .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.render_mode, Some(RenderMode::Human));
        assert_eq!(config.params["render_size"], 256);
    }
}
