//! # Generation Error Types

use thiserror::Error;

/// Errors that can occur while generating a level.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The configuration cannot produce a level.
    #[error("invalid generator configuration: {0}")]
    InvalidConfig(String),

    /// Every draw within the retry budget was unsolvable.
    #[error("no solvable level after {attempts} attempts")]
    RetryBudgetExhausted {
        /// Attempts made.
        attempts: u32,
    },
}

/// Result type for generation.
pub type GenerationResult<T> = Result<T, GenerationError>;
