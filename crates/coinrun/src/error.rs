//! # Environment Error Types

use coinrun_core::EcsError;
use coinrun_procedural::GenerationError;
use thiserror::Error;

/// Errors surfaced by the environment.
#[derive(Error, Debug)]
pub enum EnvError {
    /// Registry misuse. Indicates a wiring bug; treat as fatal.
    #[error("registry error: {0}")]
    Ecs(#[from] EcsError),

    /// Level generation failed.
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A config file is not valid TOML for [`EnvConfig`](crate::EnvConfig).
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A config file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A render surface could not be allocated.
    #[error("resource error: {0}")]
    Resource(String),

    /// Action id outside the action space.
    #[error("invalid action {action}: action space has {action_count} actions")]
    InvalidAction {
        /// The rejected id.
        action: u32,
        /// Size of the action space.
        action_count: u32,
    },
}

/// Result type for environment operations.
pub type EnvResult<T> = Result<T, EnvError>;
