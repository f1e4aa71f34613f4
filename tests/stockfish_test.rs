//! End-to-end tests against a real Stockfish binary.
//!
//! Skipped (with a message) when no binary can be found.

mod common;

use std::sync::Arc;
use std::time::Duration;

use eval_core::{replay_fens, Evaluation, Game};
use eval_worker::analyzer::analyze_game;
use eval_worker::oracle::{Oracle, OracleFactory};
use eval_worker::pool::{run_batch, FailureKind};
use eval_worker::stockfish::{EngineOptions, StockfishFactory};
use indicatif::ProgressBar;

use common::find_stockfish;

fn factory(path: String) -> StockfishFactory {
    StockfishFactory {
        path,
        options: EngineOptions {
            threads: 1,
            hash_mb: 16,
            movetime: Duration::from_millis(50),
            reply_grace: Duration::from_secs(5),
        },
    }
}

#[tokio::test]
async fn test_e4_e5_nf3_with_stockfish() {
    let sf_path = match find_stockfish() {
        Some(p) => p,
        None => { eprintln!("SKIPPING test_e4_e5_nf3_with_stockfish: Stockfish not found"); return; }
    };
    let mut engine = factory(sf_path).start().await.unwrap();

    let game = Game::from_movetext(0, "e4 e5 Nf3");
    let records = analyze_game(&mut engine, &game).await.unwrap();
    engine.shutdown().await;

    let fens = replay_fens(&["e4", "e5", "Nf3"]).unwrap();
    assert_eq!(records.len(), 3);
    for (record, fen) in records.iter().zip(&fens) {
        assert_eq!(&record.fen, fen);
        // Quiet opening positions: numeric, White-relative and modest
        match record.evaluation {
            Evaluation::Centipawns(cp) => assert!(cp.abs() < 150, "cp {cp} for {fen}"),
            other => panic!("expected centipawns for {fen}, got {other}"),
        }
    }
}

#[tokio::test]
async fn test_mate_scores_with_stockfish() {
    let sf_path = match find_stockfish() {
        Some(p) => p,
        None => { eprintln!("SKIPPING test_mate_scores_with_stockfish: Stockfish not found"); return; }
    };
    let mut engine = factory(sf_path).start().await.unwrap();

    let game = Game::from_movetext(0, "f3 e5 g4 Qh4#");
    let records = analyze_game(&mut engine, &game).await.unwrap();
    engine.shutdown().await;

    assert_eq!(records.len(), 4);
    // Black to move with mate in one: the engine's sign is kept as-is
    assert_eq!(records[2].evaluation, Evaluation::MateIn(1));
    // White is checkmated
    assert_eq!(records[3].evaluation.to_string(), "Mate in 0");
}

#[tokio::test]
async fn test_pool_with_stockfish() {
    let sf_path = match find_stockfish() {
        Some(p) => p,
        None => { eprintln!("SKIPPING test_pool_with_stockfish: Stockfish not found"); return; }
    };

    let games = vec![
        Game::from_movetext(0, "e4 e5 Nf3"),
        Game::from_movetext(1, "d4 d5"),
        Game::from_movetext(2, "e4 e5 Ke3"),
    ];
    let outcome = run_batch(Arc::new(factory(sf_path)), games, 2, &ProgressBar::hidden()).await;

    assert_eq!(outcome.games_analyzed, 2);
    assert_eq!(outcome.records.len(), 5);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].kind, FailureKind::IllegalMove);
}

#[tokio::test]
async fn test_missing_binary_fails_start() {
    let missing = factory("/nonexistent/stockfish-binary".to_string());
    let err = missing.start().await.err().expect("spawn must fail");
    assert!(matches!(err, eval_worker::WorkerError::EngineStart(_)));

    let outcome = run_batch(
        Arc::new(missing),
        vec![Game::from_movetext(0, "e4"), Game::from_movetext(1, "d4")],
        1,
        &ProgressBar::hidden(),
    )
    .await;
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].kind, FailureKind::EngineStart);
    assert_eq!(outcome.failures[1].kind, FailureKind::Unassigned);
}
