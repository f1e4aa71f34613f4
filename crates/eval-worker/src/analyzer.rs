//! Core game analysis: replay a game and score every position it passes through.

use eval_core::{Evaluation, Game, PositionRecord, Replay};
use tracing::debug;

use crate::error::WorkerError;
use crate::oracle::Oracle;

/// Analyze one game, producing one record per ply in move order.
///
/// An illegal move or an engine failure aborts the whole game; records
/// already gathered for earlier plies are discarded with it.
pub async fn analyze_game<O: Oracle>(
    oracle: &mut O,
    game: &Game,
) -> Result<Vec<PositionRecord>, WorkerError> {
    oracle.new_game().await?;

    let mut replay = Replay::new();
    let mut records = Vec::with_capacity(game.ply_count());

    for san in &game.moves {
        let ply = replay.push_san(san)?;
        let score = oracle.analyze(&ply.fen).await?;

        records.push(PositionRecord {
            evaluation: Evaluation::from_engine(score, ply.side_to_move),
            fen: ply.fen,
        });
    }

    debug!(row = game.row, plies = records.len(), "Game analyzed");
    Ok(records)
}
