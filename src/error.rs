//! Engine error types.

use thiserror::Error;

/// Errors that can occur in the training engine.
///
/// Malformed athlete data never errors; optional fields are defaulted and
/// invalid condition expressions are treated as non-matching. Errors here are
/// reserved for caller-side problems: bad configuration or unusable simulation
/// parameters.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Simulation could not be set up.
    #[error("Simulation error: {0}")]
    Simulation(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
