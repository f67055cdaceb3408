//! Error types for race session commands.

use thiserror::Error;

/// Errors a race session command can report to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RaceError {
    /// Scheduling or racing was requested before any horses were generated
    #[error("No horses available. Generate horses first.")]
    EmptyRoster,

    /// A mutating command arrived while a round is still playing out
    #[error("A race round is already in progress")]
    RaceInProgress,

    /// The session configuration is unusable
    #[error("Invalid session config: {0}")]
    Config(String),
}

impl RaceError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
