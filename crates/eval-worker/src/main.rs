//! Batch position evaluator
//!
//! Replays every game of an input CSV, scores each resulting position with a
//! local Stockfish (one process per worker) and writes the flattened
//! `Position,Evaluation` table next to a ledger of games that failed.
//!
//! Usage: eval-worker [input.csv]   (everything else comes from the environment)

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use eval_worker::config::WorkerConfig;
use eval_worker::dataset;
use eval_worker::pool::run_batch;
use eval_worker::stockfish::StockfishFactory;

fn progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games ({per_sec}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file before anything reads the environment
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut config = WorkerConfig::load()?;
    if let Some(path) = std::env::args().nth(1) {
        config.input_path = path.into();
    }
    info!(
        input = %config.input_path.display(),
        stockfish_path = %config.stockfish_path,
        analysis_ms = config.analysis_time.as_millis() as u64,
        workers = config.num_workers,
        "Worker config loaded"
    );

    let games = dataset::load_games(&config.input_path, &config.moves_column)
        .with_context(|| format!("Failed to load {}", config.input_path.display()))?;
    let input_rows = games.len();
    info!(games = input_rows, "Games loaded");

    let factory = Arc::new(StockfishFactory::from_config(&config));
    let progress = progress_bar(input_rows as u64, config.show_progress);
    let started = Instant::now();

    let outcome = run_batch(factory, games, config.num_workers, &progress).await;
    progress.finish_and_clear();

    info!(
        games_analyzed = outcome.games_analyzed,
        games_failed = outcome.failures.len(),
        positions = outcome.records.len(),
        elapsed_s = started.elapsed().as_secs(),
        "Batch complete"
    );

    let positions_path = dataset::positions_path(&config.output_dir, input_rows);
    dataset::save_positions(&positions_path, &outcome.records)
        .with_context(|| format!("Failed to write {}", positions_path.display()))?;
    info!(path = %positions_path.display(), "Positions saved");

    if !outcome.failures.is_empty() {
        let failures_path = dataset::failures_path(&config.output_dir, input_rows);
        dataset::save_failures(&failures_path, &outcome.failures)
            .with_context(|| format!("Failed to write {}", failures_path.display()))?;
        warn!(
            failed = outcome.failures.len(),
            path = %failures_path.display(),
            "Some games could not be analyzed"
        );
    }

    Ok(())
}
