//! Board replay and evaluation types shared by the batch evaluator.

pub use shakmaty;

pub mod evaluation;
pub mod game;
pub mod replay;

pub use evaluation::{EngineScore, Evaluation, PositionRecord};
pub use game::Game;
pub use replay::{replay_fens, Ply, Replay, ReplayError};
