use std::process::{Command, Stdio};

use eval_worker::eval_core::EngineScore;
use eval_worker::oracle::{Oracle, OracleFactory};
use eval_worker::WorkerError;

/// Stockfish binary from `STOCKFISH_PATH`, the crate root, or `PATH`.
#[allow(dead_code)]
pub fn find_stockfish() -> Option<String> {
    if let Ok(path) = std::env::var("STOCKFISH_PATH") {
        if std::path::Path::new(&path).exists() {
            return Some(path);
        }
    }
    let local = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("stockfish");
    if local.exists() {
        return Some(local.to_string_lossy().into_owned());
    }
    // Try PATH
    if Command::new("stockfish")
        .arg("quit")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
    {
        return Some("stockfish".to_string());
    }
    None
}

/// Material-free stand-in engine: the score depends on the FEN only.
#[allow(dead_code)]
pub struct HashOracle;

impl Oracle for HashOracle {
    async fn new_game(&mut self) -> Result<(), WorkerError> {
        Ok(())
    }

    async fn analyze(&mut self, fen: &str) -> Result<EngineScore, WorkerError> {
        let sum: i32 = fen.bytes().map(i32::from).sum();
        Ok(match sum % 7 {
            0 => EngineScore::None,
            1 => EngineScore::Mate(sum % 5 - 2),
            _ => EngineScore::Cp(sum % 300 - 150),
        })
    }

    async fn shutdown(self) {}
}

#[allow(dead_code)]
pub struct HashOracleFactory;

impl OracleFactory for HashOracleFactory {
    type Session = HashOracle;

    async fn start(&self) -> Result<HashOracle, WorkerError> {
        Ok(HashOracle)
    }
}
