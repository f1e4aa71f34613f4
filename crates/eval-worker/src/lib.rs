pub use eval_core;

pub mod analyzer;
pub mod config;
pub mod dataset;
pub mod error;
pub mod oracle;
pub mod pool;
pub mod stockfish;

pub use error::WorkerError;
