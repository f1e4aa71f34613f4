//! Stockfish engine wrapper using UCI protocol (async I/O)

use std::process::Stdio;
use std::time::Duration;

use eval_core::EngineScore;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;
use tracing::debug;

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::oracle::{Oracle, OracleFactory};

/// Per-session engine settings
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub threads: u32,
    pub hash_mb: u32,
    /// Fixed `go movetime` budget for every position
    pub movetime: Duration,
    /// Slack on top of `movetime` before a silent engine counts as broken
    pub reply_grace: Duration,
}

impl EngineOptions {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            threads: config.engine_threads,
            hash_mb: config.engine_hash_mb,
            movetime: config.analysis_time,
            reply_grace: config.reply_grace,
        }
    }

    fn read_deadline(&self) -> Duration {
        self.movetime + self.reply_grace
    }
}

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    options: EngineOptions,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(path: &str, options: EngineOptions) -> Result<Self, WorkerError> {
        let mut process = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| WorkerError::EngineStart(format!("Failed to spawn {path}: {e}")))?;

        let (stdin, stdout) = match (process.stdin.take(), process.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, BufReader::new(stdout)),
            _ => {
                let _ = process.start_kill();
                return Err(WorkerError::EngineStart("Engine pipes unavailable".into()));
            }
        };

        let mut engine = Self {
            process,
            stdin,
            stdout,
            options,
        };

        engine
            .handshake()
            .await
            .map_err(|e| WorkerError::EngineStart(format!("UCI handshake failed: {e}")))?;

        Ok(engine)
    }

    async fn handshake(&mut self) -> Result<(), WorkerError> {
        self.send("uci").await?;
        self.wait_for("uciok").await?;

        // Configure for analysis
        self.send(&format!("setoption name Threads value {}", self.options.threads))
            .await?;
        self.send(&format!("setoption name Hash value {}", self.options.hash_mb))
            .await?;
        self.send("setoption name UCI_AnalyseMode value true").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), WorkerError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| WorkerError::Engine(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| WorkerError::Engine(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one trimmed line, failing on EOF or when the engine stays silent too long
    async fn read_line(&mut self, line: &mut String) -> Result<(), WorkerError> {
        line.clear();
        let deadline = self.options.read_deadline();
        let read = timeout(deadline, self.stdout.read_line(line))
            .await
            .map_err(|_| WorkerError::Engine(format!("No reply from Stockfish within {deadline:?}")))?
            .map_err(|e| WorkerError::Engine(format!("Failed to read from Stockfish: {e}")))?;
        if read == 0 {
            return Err(WorkerError::Engine("Stockfish closed its output".into()));
        }
        debug!(line = line.trim(), "SF >");
        Ok(())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), WorkerError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            if line.trim() == expected {
                return Ok(());
            }
        }
    }

    /// Search a position for the fixed movetime and return the last exact score
    pub async fn evaluate(&mut self, fen: &str) -> Result<EngineScore, WorkerError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go movetime {}", self.options.movetime.as_millis()))
            .await?;

        let mut score = EngineScore::None;
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();

            if trimmed.starts_with("info") {
                if let Some(s) = parse_score(trimmed) {
                    score = s;
                }
            } else if trimmed.starts_with("bestmove") {
                break;
            }
        }

        Ok(score)
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        if timeout(self.options.reply_grace, self.process.wait())
            .await
            .is_err()
        {
            let _ = self.process.start_kill();
        }
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

impl Oracle for StockfishEngine {
    async fn new_game(&mut self) -> Result<(), WorkerError> {
        self.send("ucinewgame").await?;
        self.send("isready").await?;
        self.wait_for("readyok").await
    }

    async fn analyze(&mut self, fen: &str) -> Result<EngineScore, WorkerError> {
        self.evaluate(fen).await
    }

    async fn shutdown(mut self) {
        self.quit().await;
    }
}

/// Starts one Stockfish process per session
#[derive(Debug, Clone)]
pub struct StockfishFactory {
    pub path: String,
    pub options: EngineOptions,
}

impl StockfishFactory {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            path: config.stockfish_path.clone(),
            options: EngineOptions::from_config(config),
        }
    }
}

impl OracleFactory for StockfishFactory {
    type Session = StockfishEngine;

    async fn start(&self) -> Result<StockfishEngine, WorkerError> {
        StockfishEngine::new(&self.path, self.options.clone()).await
    }
}

/// Parse the score from an info line.
///
/// Bound-only scores and `info string` chatter are ignored.
fn parse_score(line: &str) -> Option<EngineScore> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.get(1) == Some(&"string") {
        return None;
    }
    if parts.iter().any(|p| *p == "lowerbound" || *p == "upperbound") {
        return None;
    }
    let idx = parts.iter().position(|p| *p == "score")?;
    let value = parts.get(idx + 2)?.parse().ok()?;
    match *parts.get(idx + 1)? {
        "cp" => Some(EngineScore::Cp(value)),
        "mate" => Some(EngineScore::Mate(value)),
        _ => None,
    }
}
