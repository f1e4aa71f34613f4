//! Worker error types

use eval_core::ReplayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to start engine: {0}")]
    EngineStart(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    #[error("Input has no '{0}' column")]
    MissingColumn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
