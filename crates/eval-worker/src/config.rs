//! Worker configuration from environment variables

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::WorkerError;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Input table with one game per row
    pub input_path: PathBuf,

    /// Column holding whitespace-separated SAN moves
    pub moves_column: String,

    /// Directory receiving the result table and the failure ledger
    pub output_dir: PathBuf,

    /// Path to Stockfish binary
    pub stockfish_path: String,

    /// Fixed search time per position
    pub analysis_time: Duration,

    /// Extra wait on top of `analysis_time` before the engine counts as unresponsive
    pub reply_grace: Duration,

    /// Stockfish `Threads` option, per engine
    pub engine_threads: u32,

    /// Stockfish `Hash` option in MB, per engine
    pub engine_hash_mb: u32,

    /// Worker count, one engine each
    pub num_workers: usize,

    pub show_progress: bool,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, WorkerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup; unparseable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WorkerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &str, default: u64| -> Duration {
            Duration::from_millis(parse_or(lookup(key), default))
        };

        let input_path = lookup("INPUT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("games.csv"));

        let moves_column = lookup("MOVES_COLUMN").unwrap_or_else(|| "moves".to_string());

        let output_dir = lookup("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let stockfish_path =
            lookup("STOCKFISH_PATH").unwrap_or_else(|| "/usr/local/bin/stockfish".to_string());

        let analysis_time = millis("ANALYSIS_TIME_MS", 100);
        let reply_grace = millis("ENGINE_REPLY_GRACE_MS", 5_000);
        let engine_threads: u32 = parse_or(lookup("ENGINE_THREADS"), 1);
        let engine_hash_mb: u32 = parse_or(lookup("ENGINE_HASH_MB"), 64);
        let num_workers: usize = parse_or(lookup("NUM_WORKERS"), num_cpus::get());

        let show_progress = lookup("SHOW_PROGRESS")
            .map(|v| !matches!(v.trim(), "0" | "false" | "no"))
            .unwrap_or(true);

        if num_workers == 0 {
            return Err(WorkerError::Config("NUM_WORKERS must be at least 1".into()));
        }
        if analysis_time.is_zero() {
            return Err(WorkerError::Config("ANALYSIS_TIME_MS must be positive".into()));
        }
        if engine_threads == 0 {
            return Err(WorkerError::Config("ENGINE_THREADS must be at least 1".into()));
        }

        Ok(Self {
            input_path,
            moves_column,
            output_dir,
            stockfish_path,
            analysis_time,
            reply_grace,
            engine_threads,
            engine_hash_mb,
            num_workers,
            show_progress,
        })
    }
}

/// Parse into the target type; anything that does not fit falls back to `default`.
fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
