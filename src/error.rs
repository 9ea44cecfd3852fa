//! Error types for the engine

use thiserror::Error;

/// The main error type for engine operations
///
/// Only misconfiguration and settings I/O are errors. Expected absence (no step
/// at a tick, no collision, an already-removed instance) is reported through
/// `Option`/`bool` instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Spawner start must not be negative, got {0}")]
    NegativeSpawnStart(i64),

    #[error("Spawner duration must not be negative, got {0}")]
    NegativeSpawnDuration(i64),

    #[error("Spawner amount must be between 1 and the duration ({duration}), got {amount}")]
    SpawnAmountOutOfRange { amount: i64, duration: i64 },

    #[error("Spawner window starting at {start} with duration {duration} ends past the last tick")]
    SpawnWindowOverflow { start: i64, duration: i64 },

    #[error("Backend not available: requested {requested}, active target is {active}")]
    MissingBackend {
        requested: &'static str,
        active: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
