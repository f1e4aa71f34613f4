//! Evaluation oracle seam between the analyzer and a concrete engine.
//!
//! Methods return `impl Future + Send` so sessions can live inside
//! `tokio::spawn`ed workers.

use std::future::Future;

use eval_core::EngineScore;

use crate::error::WorkerError;

/// One exclusively owned engine session.
///
/// A session is never shared between workers; every call takes `&mut self`.
pub trait Oracle: Send {
    /// Signal that the next positions belong to an unrelated game.
    fn new_game(&mut self) -> impl Future<Output = Result<(), WorkerError>> + Send;

    /// Score `fen` within the session's fixed time budget.
    fn analyze(&mut self, fen: &str) -> impl Future<Output = Result<EngineScore, WorkerError>> + Send;

    /// Terminate the session.
    fn shutdown(self) -> impl Future<Output = ()> + Send;
}

/// Starts sessions; shared by every worker of a pool.
pub trait OracleFactory: Send + Sync + 'static {
    type Session: Oracle + 'static;

    fn start(&self) -> impl Future<Output = Result<Self::Session, WorkerError>> + Send;
}
