//! Engine scores and their normalized, White-relative form.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use shakmaty::Color;

/// Raw score as reported by the engine, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineScore {
    Cp(i32),
    /// Mate in N moves (positive = side to move mates, negative = gets mated)
    Mate(i32),
    /// Engine answered without any score
    None,
}

/// Evaluation as it appears in the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Centipawns from White's perspective
    Centipawns(i32),
    /// Engine's signed mate distance, never sign-adjusted
    MateIn(i32),
    Unknown,
}

impl Evaluation {
    /// Normalize a score reported for a position with `side_to_move` to play.
    ///
    /// Centipawns are flipped when Black is to move so every numeric value is
    /// White-relative. Mate distances keep the engine's sign.
    pub fn from_engine(score: EngineScore, side_to_move: Color) -> Self {
        match score {
            EngineScore::Mate(n) => Evaluation::MateIn(n),
            EngineScore::Cp(cp) => match side_to_move {
                Color::White => Evaluation::Centipawns(cp),
                Color::Black => Evaluation::Centipawns(cp.saturating_neg()),
            },
            EngineScore::None => Evaluation::Unknown,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Centipawns(cp) => write!(f, "{cp}"),
            Evaluation::MateIn(n) => write!(f, "Mate in {n}"),
            Evaluation::Unknown => f.write_str("unknown"),
        }
    }
}

impl FromStr for Evaluation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "unknown" {
            return Ok(Evaluation::Unknown);
        }
        if let Some(n) = s.strip_prefix("Mate in ") {
            return n
                .parse()
                .map(Evaluation::MateIn)
                .map_err(|e| format!("bad mate distance '{n}': {e}"));
        }
        s.parse()
            .map(Evaluation::Centipawns)
            .map_err(|e| format!("bad evaluation '{s}': {e}"))
    }
}

// Centipawns go out as integers so the column stays numeric where it can.
impl Serialize for Evaluation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Evaluation::Centipawns(cp) => serializer.serialize_i32(*cp),
            other => serializer.collect_str(other),
        }
    }
}

/// One row of the result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionRecord {
    #[serde(rename = "Position")]
    pub fen: String,
    #[serde(rename = "Evaluation")]
    pub evaluation: Evaluation,
}
