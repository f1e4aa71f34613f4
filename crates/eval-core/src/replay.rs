//! SAN replay on a shakmaty board, one ply at a time.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::{Chess, Color, EnPassantMode, Position};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("ply {ply}: '{token}' is not SAN")]
    InvalidSan { ply: usize, token: String },

    #[error("ply {ply}: illegal move '{token}' in {fen}")]
    IllegalMove {
        ply: usize,
        token: String,
        fen: String,
    },
}

/// Board state right after a move was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ply {
    /// 1-indexed half-move number
    pub number: usize,
    pub fen: String,
    pub side_to_move: Color,
}

/// Mutable replay of a single game from the standard start position.
#[derive(Debug, Clone, Default)]
pub struct Replay {
    pos: Chess,
    ply: usize,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fen(&self) -> String {
        Fen::from_position(&self.pos, EnPassantMode::Legal).to_string()
    }

    pub fn side_to_move(&self) -> Color {
        self.pos.turn()
    }

    /// Apply one SAN token (check/mate suffixes allowed) and return the new position.
    ///
    /// Ambiguous SAN is rejected as illegal. The replay is left unchanged on error.
    pub fn push_san(&mut self, token: &str) -> Result<Ply, ReplayError> {
        let number = self.ply + 1;

        let san_plus: SanPlus = token.parse().map_err(|_| ReplayError::InvalidSan {
            ply: number,
            token: token.to_string(),
        })?;

        let illegal = || ReplayError::IllegalMove {
            ply: number,
            token: token.to_string(),
            fen: self.fen(),
        };

        let mv = san_plus.san.to_move(&self.pos).map_err(|_| illegal())?;
        let next = self.pos.clone().play(mv).map_err(|_| illegal())?;

        self.pos = next;
        self.ply = number;

        Ok(Ply {
            number,
            fen: self.fen(),
            side_to_move: self.side_to_move(),
        })
    }
}

/// Replay a whole move list and return the FEN after every ply.
pub fn replay_fens<S: AsRef<str>>(moves: &[S]) -> Result<Vec<String>, ReplayError> {
    let mut replay = Replay::new();
    moves
        .iter()
        .map(|san| replay.push_san(san.as_ref()).map(|ply| ply.fen))
        .collect()
}
