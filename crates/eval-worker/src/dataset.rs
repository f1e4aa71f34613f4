//! CSV input of games and output of evaluated positions

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use eval_core::{Game, PositionRecord};
use serde::Serialize;

use crate::error::WorkerError;
use crate::pool::GameFailure;

/// Read games from CSV with a header row; `column` holds the movetext.
pub fn read_games<R: Read>(reader: R, column: &str) -> Result<Vec<Game>, WorkerError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let idx = rdr
        .headers()?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| WorkerError::MissingColumn(column.to_string()))?;

    let mut games = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let movetext = record.get(idx).unwrap_or("");
        games.push(Game::from_movetext(row, movetext));
    }
    Ok(games)
}

pub fn load_games(path: &Path, column: &str) -> Result<Vec<Game>, WorkerError> {
    let file = File::open(path)?;
    read_games(file, column)
}

/// Write the result table with `Position` and `Evaluation` columns.
pub fn write_positions<W: Write>(writer: W, records: &[PositionRecord]) -> Result<(), WorkerError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(["Position", "Evaluation"])?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_positions(path: &Path, records: &[PositionRecord]) -> Result<(), WorkerError> {
    write_positions(File::create(path)?, records)
}

#[derive(Serialize)]
struct FailureRow<'a> {
    #[serde(rename = "Row")]
    row: usize,
    #[serde(rename = "Kind")]
    kind: &'static str,
    #[serde(rename = "Reason")]
    reason: &'a str,
}

/// Write the failed-games ledger, sorted by input row.
pub fn write_failures<W: Write>(writer: W, failures: &[GameFailure]) -> Result<(), WorkerError> {
    let mut sorted: Vec<&GameFailure> = failures.iter().collect();
    sorted.sort_by_key(|f| f.row);

    let mut wtr = csv::Writer::from_writer(writer);
    for failure in sorted {
        wtr.serialize(FailureRow {
            row: failure.row,
            kind: failure.kind.as_str(),
            reason: &failure.reason,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_failures(path: &Path, failures: &[GameFailure]) -> Result<(), WorkerError> {
    write_failures(File::create(path)?, failures)
}

/// Result table path, named after the number of input rows.
pub fn positions_path(dir: &Path, input_rows: usize) -> PathBuf {
    dir.join(format!("evaluated_positions_{input_rows}.csv"))
}

pub fn failures_path(dir: &Path, input_rows: usize) -> PathBuf {
    dir.join(format!("failed_games_{input_rows}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::FailureKind;
    use eval_core::Evaluation;

    #[test]
    fn test_read_games_by_column_name() {
        let input = "id,moves,result\n\
                     a1,e4 e5 Nf3,1-0\n\
                     a2,\"d4 d5 c4\",0-1\n";
        let games = read_games(input.as_bytes(), "moves").unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].row, 0);
        assert_eq!(games[0].moves, vec!["e4", "e5", "Nf3"]);
        assert_eq!(games[1].row, 1);
        assert_eq!(games[1].moves, vec!["d4", "d5", "c4"]);
    }

    #[test]
    fn test_read_games_short_row_is_empty_game() {
        let input = "id,moves\nx\n";
        let games = read_games(input.as_bytes(), "moves").unwrap();
        assert_eq!(games.len(), 1);
        assert!(games[0].moves.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let err = read_games("id,san\n1,e4\n".as_bytes(), "moves").unwrap_err();
        assert!(matches!(err, WorkerError::MissingColumn(c) if c == "moves"));
    }

    #[test]
    fn test_write_positions() {
        let records = vec![
            PositionRecord {
                fen: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1".into(),
                evaluation: Evaluation::Centipawns(-31),
            },
            PositionRecord {
                fen: "8/8/8/8/8/5k2/6q1/7K w - - 0 60".into(),
                evaluation: Evaluation::MateIn(-1),
            },
            PositionRecord {
                fen: "8/8/8/8/8/8/8/K6k w - - 0 1".into(),
                evaluation: Evaluation::Unknown,
            },
        ];
        let mut out = Vec::new();
        write_positions(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Position,Evaluation");
        assert_eq!(
            lines[1],
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1,-31"
        );
        assert_eq!(lines[2], "8/8/8/8/8/5k2/6q1/7K w - - 0 60,Mate in -1");
        assert_eq!(lines[3], "8/8/8/8/8/8/8/K6k w - - 0 1,unknown");
    }

    #[test]
    fn test_write_positions_empty_still_has_header() {
        let mut out = Vec::new();
        write_positions(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Position,Evaluation\n");
    }

    #[test]
    fn test_write_failures_sorted() {
        let failures = vec![
            GameFailure {
                row: 9,
                kind: FailureKind::Engine,
                reason: "Engine error: pipe closed".into(),
            },
            GameFailure {
                row: 2,
                kind: FailureKind::IllegalMove,
                reason: "ply 3: illegal move 'Qxf7'".into(),
            },
        ];
        let mut out = Vec::new();
        write_failures(&mut out, &failures).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Row,Kind,Reason");
        assert!(lines[1].starts_with("2,illegal_move,"));
        assert!(lines[2].starts_with("9,engine,"));
    }

    #[test]
    fn test_output_paths() {
        let dir = Path::new("/data");
        assert_eq!(
            positions_path(dir, 1200),
            PathBuf::from("/data/evaluated_positions_1200.csv")
        );
        assert_eq!(
            failures_path(dir, 1200),
            PathBuf::from("/data/failed_games_1200.csv")
        );
    }
}
