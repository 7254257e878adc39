//! # CoinRun Rollout
//!
//! Headless runner: plays episodes with a fixed policy and logs returns.
//! Used for smoke tests and profiling; no window, no GPU.
//!
//! ## Usage
//!
//! ```bash
//! # Three random-policy episodes from seed 42
//! COINRUN_SEED=42 COINRUN_EPISODES=3 ./rollout
//!
//! # Custom config, always run right and jump, verbose
//! RUST_LOG=debug COINRUN_CONFIG=coinrun.toml COINRUN_POLICY=right ./rollout
//! ```
//!
//! | Variable            | Default  | Meaning                              |
//! |---------------------|----------|--------------------------------------|
//! | `COINRUN_CONFIG`    | none     | TOML file for `EnvConfig`            |
//! | `COINRUN_SEED`      | clock    | Episode stream seed                  |
//! | `COINRUN_EPISODES`  | 3        | Episodes to play                     |
//! | `COINRUN_MAX_STEPS` | 1000     | Step limit per episode               |
//! | `COINRUN_POLICY`    | random   | `random` or `right`                  |

use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use coinrun::{CoinRunEnv, EnvConfig, EnvError, EnvOptions, EnvResult, ACTION_COUNT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

/// Action id for "right + jump".
const RIGHT_JUMP: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Policy {
    Random,
    Right,
}

struct Settings {
    config: EnvConfig,
    seed: Option<u64>,
    episodes: u32,
    max_steps: u64,
    policy: Policy,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn env_parse<T: FromStr>(name: &str) -> EnvResult<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EnvError::InvalidConfig(format!("{name}={raw} is not valid"))),
        Err(_) => Ok(None),
    }
}

fn settings() -> EnvResult<Settings> {
    let config = match std::env::var("COINRUN_CONFIG") {
        Ok(path) => EnvConfig::load(path)?,
        Err(_) => EnvConfig::default(),
    };
    let policy = match std::env::var("COINRUN_POLICY").as_deref() {
        Ok("right") => Policy::Right,
        Ok("random") | Err(_) => Policy::Random,
        Ok(other) => {
            return Err(EnvError::InvalidConfig(format!(
                "COINRUN_POLICY={other}: expected `random` or `right`"
            )))
        }
    };
    Ok(Settings {
        config,
        seed: env_parse("COINRUN_SEED")?,
        episodes: env_parse("COINRUN_EPISODES")?.unwrap_or(3),
        max_steps: env_parse("COINRUN_MAX_STEPS")?.unwrap_or(1000),
        policy,
    })
}

fn run(settings: Settings) -> EnvResult<()> {
    let (mut env, spaces) = CoinRunEnv::make(settings.config, EnvOptions { seed: settings.seed })?;
    tracing::info!(
        observation = ?spaces.observation.shape,
        actions = spaces.action.n,
        policy = ?settings.policy,
        "rollout starting"
    );

    let mut policy_rng = ChaCha8Rng::seed_from_u64(settings.seed.unwrap_or(0));
    let mut wins = 0u32;
    let started = Instant::now();
    let mut total_steps = 0u64;

    for episode in 0..settings.episodes {
        if episode > 0 {
            env.reset(None)?;
        }
        let mut outcome = "limit";
        for _ in 0..settings.max_steps {
            let action = match settings.policy {
                Policy::Random => policy_rng.gen_range(0..ACTION_COUNT),
                Policy::Right => RIGHT_JUMP,
            };
            let step = env.step(action)?;
            if step.terminated {
                outcome = if step.reward > 0.0 { "goal" } else { "dead" };
                break;
            }
        }
        if outcome == "goal" {
            wins += 1;
        }
        total_steps += env.episode_steps();
        tracing::info!(
            episode,
            steps = env.episode_steps(),
            episode_return = env.episode_return(),
            outcome,
            "episode done"
        );
    }

    let elapsed = started.elapsed().as_secs_f64();
    tracing::info!(
        episodes = settings.episodes,
        wins,
        total_steps,
        steps_per_sec = if elapsed > 0.0 { total_steps as f64 / elapsed } else { 0.0 },
        "rollout finished"
    );
    env.close();
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match settings().and_then(run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "rollout failed");
            ExitCode::FAILURE
        }
    }
}
