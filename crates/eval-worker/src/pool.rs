//! Worker pool: fans games out to workers that each own one engine session,
//! and gathers per-game outcomes on a single collector.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use eval_core::{Game, PositionRecord};
use indicatif::ProgressBar;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::analyzer::analyze_game;
use crate::error::WorkerError;
use crate::oracle::{Oracle, OracleFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    IllegalMove,
    Engine,
    EngineStart,
    /// Never picked up because every worker had stopped
    Unassigned,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::IllegalMove => "illegal_move",
            FailureKind::Engine => "engine",
            FailureKind::EngineStart => "engine_start",
            FailureKind::Unassigned => "unassigned",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger entry for a game that produced no records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameFailure {
    pub row: usize,
    pub kind: FailureKind,
    pub reason: String,
}

impl GameFailure {
    fn from_error(row: usize, err: &WorkerError) -> Self {
        let kind = match err {
            WorkerError::Replay(_) => FailureKind::IllegalMove,
            WorkerError::EngineStart(_) => FailureKind::EngineStart,
            _ => FailureKind::Engine,
        };
        Self {
            row,
            kind,
            reason: err.to_string(),
        }
    }
}

/// Everything a batch produced, successful or not
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Flattened records of all successful games, in completion order
    pub records: Vec<PositionRecord>,
    pub failures: Vec<GameFailure>,
    pub games_analyzed: usize,
}

struct GameOutcome {
    row: usize,
    result: Result<Vec<PositionRecord>, GameFailure>,
}

type GameQueue = Arc<Mutex<mpsc::UnboundedReceiver<Game>>>;

/// Analyze every game on up to `num_workers` workers.
///
/// Completion order is not submission order. Each game ends up either in
/// `records` or as exactly one entry in `failures`.
pub async fn run_batch<F: OracleFactory>(
    factory: Arc<F>,
    games: Vec<Game>,
    num_workers: usize,
    progress: &ProgressBar,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    if games.is_empty() {
        return outcome;
    }

    let rows: Vec<usize> = games.iter().map(|g| g.row).collect();
    let workers = num_workers.clamp(1, games.len());

    let (game_tx, game_rx) = mpsc::unbounded_channel();
    for game in games {
        // Receiver is alive until every worker is gone
        let _ = game_tx.send(game);
    }
    drop(game_tx);
    let queue: GameQueue = Arc::new(Mutex::new(game_rx));

    let (result_tx, mut result_rx) = mpsc::unbounded_channel();
    let mut handles = JoinSet::new();
    for worker_id in 0..workers {
        handles.spawn(worker_loop(
            worker_id,
            factory.clone(),
            queue.clone(),
            result_tx.clone(),
        ));
    }
    drop(result_tx);
    info!(workers, games = rows.len(), "Worker pool started");

    let mut seen = HashSet::with_capacity(rows.len());
    while let Some(GameOutcome { row, result }) = result_rx.recv().await {
        seen.insert(row);
        match result {
            Ok(records) => {
                outcome.games_analyzed += 1;
                outcome.records.extend(records);
            }
            Err(failure) => {
                warn!(row, kind = %failure.kind, reason = %failure.reason, "Game failed");
                outcome.failures.push(failure);
            }
        }
        progress.inc(1);
    }

    while let Some(joined) = handles.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "Worker task aborted");
        }
    }

    for row in rows {
        if !seen.contains(&row) {
            outcome.failures.push(GameFailure {
                row,
                kind: FailureKind::Unassigned,
                reason: "no worker was left to analyze this game".to_string(),
            });
            progress.inc(1);
        }
    }

    outcome
}

/// One worker: owns at most one session at a time, started before its first game.
async fn worker_loop<F: OracleFactory>(
    worker_id: usize,
    factory: Arc<F>,
    queue: GameQueue,
    results: mpsc::UnboundedSender<GameOutcome>,
) {
    let mut session: Option<F::Session> = None;

    loop {
        let next = queue.lock().await.recv().await;
        let Some(game) = next else { break };
        let row = game.row;

        if session.is_none() {
            match factory.start().await {
                Ok(s) => {
                    info!(worker_id, "Engine session started");
                    session = Some(s);
                }
                Err(e) => {
                    error!(worker_id, row, error = %e, "Engine session failed to start, worker stopping");
                    let _ = results.send(GameOutcome {
                        row,
                        result: Err(GameFailure::from_error(row, &e)),
                    });
                    break;
                }
            }
        }
        let Some(oracle) = session.as_mut() else { break };

        let result = analyze_game(oracle, &game).await;
        let broken = matches!(result, Err(WorkerError::Engine(_)));

        let sent = results.send(GameOutcome {
            row,
            result: result.map_err(|e| GameFailure::from_error(row, &e)),
        });

        if broken {
            warn!(worker_id, row, "Engine session broken, restarting before next game");
            if let Some(s) = session.take() {
                s.shutdown().await;
            }
        }
        if sent.is_err() {
            break;
        }
    }

    if let Some(s) = session.take() {
        s.shutdown().await;
        info!(worker_id, "Engine session closed");
    }
}
