//! # Environment
//!
//! The reset/step/render surface consumed by training code.
//!
//! - Observations are `obs_width × obs_height × 3` bytes, rendered after
//!   each step's simulation so they show the step's result.
//! - Reward is `goal_reward` on the step the goal is touched, zero
//!   otherwise. Death is unrewarded.
//! - `terminated` is set exactly on the step the agent dies or reaches the
//!   goal; `truncated` is never set (episode length limits belong to the
//!   caller).
//!
//! ```rust,ignore
//! let (mut env, spaces) = CoinRunEnv::make(EnvConfig::default(), EnvOptions { seed: Some(42) })?;
//! let mut obs = env.reset(None)?.to_vec();
//! loop {
//!     let step = env.step(5)?;
//!     if step.terminated {
//!         break;
//!     }
//! }
//! env.close();
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use crate::action::{Intent, ACTION_COUNT};
use crate::config::EnvConfig;
use crate::error::{EnvError, EnvResult};
use crate::render::{extract_rgb, RenderTarget, SoftwareSurface};
use crate::simulation::Simulation;

/// Options fixed at creation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnvOptions {
    /// Seed of the episode stream. `None` seeds from the clock.
    pub seed: Option<u64>,
}

/// A box of bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxSpace {
    /// `[height, width, channels]`.
    pub shape: [usize; 3],
    /// Lowest value.
    pub low: u8,
    /// Highest value.
    pub high: u8,
}

/// A single discrete choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscreteSpace {
    /// Number of choices.
    pub n: u32,
}

/// Observation and action spaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spaces {
    /// Observation space.
    pub observation: BoxSpace,
    /// Action space.
    pub action: DiscreteSpace,
}

/// What one step returns.
#[derive(Debug)]
pub struct StepResult<'a> {
    /// Observation after the step.
    pub observation: &'a [u8],
    /// Reward earned by the step.
    pub reward: f32,
    /// The episode ended by death or goal.
    pub terminated: bool,
    /// Always `false`.
    pub truncated: bool,
}

/// A CoinRun environment instance.
pub struct CoinRunEnv {
    sim: Simulation,
    spaces: Spaces,
    obs_surface: SoftwareSurface,
    frame_surface: SoftwareSurface,
    observation: Vec<u8>,
    frame: Vec<u8>,
    episode_steps: u64,
    episode_return: f32,
    done: bool,
}

impl CoinRunEnv {
    /// Validates `config`, allocates surfaces and starts the first episode.
    ///
    /// # Errors
    ///
    /// Configuration, allocation, registry or generation errors.
    pub fn make(config: EnvConfig, options: EnvOptions) -> EnvResult<(Self, Spaces)> {
        config.validate()?;

        let seed = options.seed.unwrap_or_else(clock_seed);
        if options.seed.is_none() {
            tracing::info!(seed, "no seed supplied, seeded from the clock");
        }

        let spaces = Spaces {
            observation: BoxSpace {
                shape: [config.obs_height as usize, config.obs_width as usize, 3],
                low: 0,
                high: 255,
            },
            action: DiscreteSpace { n: ACTION_COUNT },
        };
        let obs_surface = SoftwareSurface::new(config.obs_width, config.obs_height)?;
        let frame_surface = SoftwareSurface::new(config.render_width, config.render_height)?;
        let observation = vec![0; 3 * config.obs_width as usize * config.obs_height as usize];
        let frame = vec![0; 3 * config.render_width as usize * config.render_height as usize];

        let sim = Simulation::new(config, seed)?;
        let mut env = Self {
            sim,
            spaces,
            obs_surface,
            frame_surface,
            observation,
            frame,
            episode_steps: 0,
            episode_return: 0.0,
            done: false,
        };
        env.refresh_observation()?;

        tracing::info!(
            seed,
            obs_width = env.sim.config().obs_width,
            obs_height = env.sim.config().obs_height,
            actions = ACTION_COUNT,
            "environment created"
        );
        Ok((env, spaces))
    }

    /// Starts a new episode and returns its first observation.
    ///
    /// With a seed, the episode stream restarts from it; without one, the
    /// next level in the current stream is used.
    ///
    /// # Errors
    ///
    /// Registry or generation errors.
    pub fn reset(&mut self, seed: Option<u64>) -> EnvResult<&[u8]> {
        if let Some(seed) = seed {
            tracing::info!(seed, "reseeding episode stream");
        }
        self.sim.reset(seed)?;
        self.episode_steps = 0;
        self.episode_return = 0.0;
        self.done = false;
        self.refresh_observation()?;
        Ok(&self.observation)
    }

    /// Applies one action.
    ///
    /// Stepping a finished episode changes nothing: it returns the last
    /// observation, zero reward and `terminated = true`.
    ///
    /// # Errors
    ///
    /// [`EnvError::InvalidAction`] for ids outside the action space;
    /// registry errors otherwise.
    pub fn step(&mut self, action: u32) -> EnvResult<StepResult<'_>> {
        let intent = Intent::from_action(action).ok_or(EnvError::InvalidAction {
            action,
            action_count: ACTION_COUNT,
        })?;

        if self.done {
            tracing::warn!(
                steps = self.episode_steps,
                "step called on a finished episode; call reset first"
            );
            return Ok(StepResult {
                observation: &self.observation,
                reward: 0.0,
                terminated: true,
                truncated: false,
            });
        }

        let outcome = self.sim.tick(intent)?;
        let reward = if outcome.goal_reached {
            self.sim.config().goal_reward
        } else {
            0.0
        };
        let terminated = !outcome.alive;

        self.episode_steps += 1;
        self.episode_return += reward;
        if terminated {
            self.done = true;
            tracing::debug!(
                steps = self.episode_steps,
                episode_return = self.episode_return,
                goal = outcome.goal_reached,
                "episode finished"
            );
        }

        self.refresh_observation()?;
        Ok(StepResult {
            observation: &self.observation,
            reward,
            terminated,
            truncated: false,
        })
    }

    /// Renders the full-size frame (`render_width × render_height × 3`).
    ///
    /// # Errors
    ///
    /// Registry errors (wiring bugs).
    pub fn render(&mut self) -> EnvResult<&[u8]> {
        self.sim.render(&mut self.frame_surface)?;
        extract_rgb(
            self.frame_surface.pixels(),
            self.frame_surface.width() as usize,
            self.frame_surface.height() as usize,
            &mut self.frame,
        );
        Ok(&self.frame)
    }

    /// Releases the environment.
    pub fn close(self) {
        tracing::debug!(steps = self.episode_steps, "environment closed");
    }

    fn refresh_observation(&mut self) -> EnvResult<()> {
        self.sim.render(&mut self.obs_surface)?;
        extract_rgb(
            self.obs_surface.pixels(),
            self.obs_surface.width() as usize,
            self.obs_surface.height() as usize,
            &mut self.observation,
        );
        Ok(())
    }

    /// Last observation.
    #[inline]
    #[must_use]
    pub fn observation(&self) -> &[u8] {
        &self.observation
    }

    /// Observation and action spaces.
    #[inline]
    #[must_use]
    pub const fn spaces(&self) -> Spaces {
        self.spaces
    }

    /// The underlying simulation.
    #[inline]
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Steps taken in the current episode.
    #[inline]
    #[must_use]
    pub const fn episode_steps(&self) -> u64 {
        self.episode_steps
    }

    /// Reward accumulated in the current episode.
    #[inline]
    #[must_use]
    pub const fn episode_return(&self) -> f32 {
        self.episode_return
    }

    /// Returns `true` once the current episode has terminated.
    #[inline]
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}
