/// One input game: the data-row it came from and its SAN moves in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub row: usize,
    pub moves: Vec<String>, // SAN notation
}

impl Game {
    /// Split a movetext cell on whitespace.
    pub fn from_movetext(row: usize, movetext: &str) -> Self {
        Self {
            row,
            moves: movetext.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }
}
