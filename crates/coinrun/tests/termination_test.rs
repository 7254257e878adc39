//! # Termination Integration Test
//!
//! `terminated` is raised exactly when the agent dies or reaches the goal.
//! Goals pay `goal_reward`; deaths pay nothing; finished episodes stay
//! finished until reset.

use coinrun::components::AgentState;
use coinrun::{CoinRunEnv, EnvConfig, EnvOptions, ACTION_COUNT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const SEEDS: u64 = 40;
const MAX_STEPS: u32 = 400;

fn config() -> EnvConfig {
    EnvConfig {
        render_width: 64,
        render_height: 64,
        ..EnvConfig::default()
    }
}

#[test]
fn test_terminated_matches_agent_state() {
    let mut goals = 0;
    let mut deaths = 0;

    for seed in 0..SEEDS {
        let (mut env, _) = CoinRunEnv::make(config(), EnvOptions { seed: Some(seed) }).unwrap();
        let goal_reward = env.simulation().config().goal_reward;
        let mut policy = ChaCha8Rng::seed_from_u64(seed ^ 0xC0FFEE);

        for _ in 0..MAX_STEPS {
            // Bias towards moving right so some episodes reach the goal.
            let action = if policy.gen_bool(0.6) {
                5
            } else {
                policy.gen_range(0..ACTION_COUNT)
            };
            let step = env.step(action).unwrap();
            let (reward, terminated) = (step.reward, step.terminated);
            assert!(!step.truncated);

            let state = env.simulation().agent().unwrap().state;
            assert_eq!(terminated, state.is_terminal(), "seed {seed}: {state:?}");
            match state {
                AgentState::GoalReached => {
                    assert!(reward > 0.0);
                    assert!((reward - goal_reward).abs() < f32::EPSILON);
                    goals += 1;
                }
                AgentState::Dead => {
                    assert!(reward.abs() < f32::EPSILON);
                    deaths += 1;
                }
                AgentState::Grounded | AgentState::Airborne => {
                    assert!(reward.abs() < f32::EPSILON);
                }
            }
            if terminated {
                assert!(env.is_done());
                assert!((env.episode_return() - reward).abs() < f32::EPSILON);
                break;
            }
        }
    }

    // The sweep is only meaningful if both endings occurred.
    assert!(goals + deaths > 0, "no episode ended in {MAX_STEPS} steps");
}

#[test]
fn test_finished_episode_is_inert() {
    for seed in 0..SEEDS {
        let (mut env, _) = CoinRunEnv::make(config(), EnvOptions { seed: Some(seed) }).unwrap();
        let mut ended = false;
        for _ in 0..MAX_STEPS {
            if env.step(5).unwrap().terminated {
                ended = true;
                break;
            }
        }
        if !ended {
            continue;
        }

        let steps = env.episode_steps();
        let position = env.simulation().agent_transform().unwrap();
        let state = env.simulation().agent().unwrap().state;
        for action in [0, 1, 3, 5] {
            let step = env.step(action).unwrap();
            assert!(step.terminated);
            assert!(step.reward.abs() < f32::EPSILON);
        }
        assert_eq!(env.episode_steps(), steps);
        assert_eq!(env.simulation().agent_transform().unwrap(), position);
        assert_eq!(env.simulation().agent().unwrap().state, state);

        env.reset(None).unwrap();
        assert!(!env.is_done());
        assert!(!env.simulation().agent().unwrap().state.is_terminal());
        return;
    }
    panic!("no seed terminated under right+jump");
}
