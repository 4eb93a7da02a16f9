//! Move records and replay
//!
//! Every applied move can be appended to a [`MoveStore`]. A recorded match is
//! replayed by rebuilding the starting board and pushing each move back
//! through the movement rules, broadcasting `BOARD` after each one.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use checkers_core::{
    frame, BacktrackRule, Board, Color, Coord, GameError, MovementStrategy, Seat, Variant,
};

use crate::coordinator::board_notices;

/// One match as it was set up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInfo {
    pub match_id: Uuid,
    pub variant: Variant,
    pub seat_count: usize,
    pub bots: usize,
    pub started_at: DateTime<Utc>,
}

impl MatchInfo {
    pub fn new(variant: Variant, seat_count: usize, bots: usize) -> Self {
        Self {
            match_id: Uuid::new_v4(),
            variant,
            seat_count,
            bots,
            started_at: Utc::now(),
        }
    }

    /// A seed derived from the match id, for bots that should differ between
    /// matches but be reproducible from a record.
    pub fn seed(&self) -> u64 {
        let id = self.match_id.as_u128();
        (id as u64) ^ ((id >> 64) as u64)
    }
}

/// One applied move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub match_id: Uuid,
    /// 1-based position of the move within its match.
    pub seq: u32,
    pub color: Color,
    pub from: Coord,
    pub to: Coord,
    pub recorded_at: DateTime<Utc>,
}

impl MoveRecord {
    pub fn new(match_id: Uuid, seq: u32, color: Color, from: Coord, to: Coord) -> Self {
        Self {
            match_id,
            seq,
            color,
            from,
            to,
            recorded_at: Utc::now(),
        }
    }
}

/// Somewhere to keep match history.
pub trait MoveStore: Send {
    fn begin(&mut self, info: &MatchInfo) -> Result<(), GameError>;

    fn record(&mut self, record: &MoveRecord) -> Result<(), GameError>;

    fn matches(&self) -> Result<Vec<MatchInfo>, GameError>;

    /// Moves of one match in play order.
    fn moves(&self, match_id: Uuid) -> Result<Vec<MoveRecord>, GameError>;
}

#[derive(Debug, Default)]
struct MemoryLog {
    matches: Vec<MatchInfo>,
    moves: Vec<MoveRecord>,
}

/// In-process store. Clones share the same log, so a caller can keep a handle
/// after giving one to a coordinator.
#[derive(Debug, Clone, Default)]
pub struct MemoryMoveStore {
    log: Arc<Mutex<MemoryLog>>,
}

impl MemoryMoveStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_log<T>(&self, f: impl FnOnce(&mut MemoryLog) -> T) -> Result<T, GameError> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| GameError::persistence("memory store lock poisoned"))?;
        Ok(f(&mut log))
    }
}

impl MoveStore for MemoryMoveStore {
    fn begin(&mut self, info: &MatchInfo) -> Result<(), GameError> {
        self.with_log(|log| log.matches.push(info.clone()))
    }

    fn record(&mut self, record: &MoveRecord) -> Result<(), GameError> {
        self.with_log(|log| log.moves.push(record.clone()))
    }

    fn matches(&self) -> Result<Vec<MatchInfo>, GameError> {
        self.with_log(|log| log.matches.clone())
    }

    fn moves(&self, match_id: Uuid) -> Result<Vec<MoveRecord>, GameError> {
        self.with_log(|log| {
            let mut moves: Vec<MoveRecord> = log
                .moves
                .iter()
                .filter(|m| m.match_id == match_id)
                .cloned()
                .collect();
            moves.sort_by_key(|m| m.seq);
            moves
        })
    }
}

/// One line of the JSON-lines log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum LogEntry {
    Match(MatchInfo),
    Move(MoveRecord),
}

/// Append-only file store, one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonLinesMoveStore {
    path: PathBuf,
}

impl JsonLinesMoveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &LogEntry) -> Result<(), GameError> {
        let json = serde_json::to_string(entry)
            .map_err(|e| GameError::persistence(format!("failed to serialize: {e}")))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error("open", e))?;
        writeln!(file, "{json}").map_err(|e| self.io_error("write", e))
    }

    fn entries(&self) -> Result<Vec<LogEntry>, GameError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error("read", e)),
        };

        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| {
                    let at = format!("{}:{}", self.path.display(), i + 1);
                    GameError::persistence(format!("{at}: failed to parse: {e}"))
                })
            })
            .collect()
    }

    fn io_error(&self, action: &str, err: std::io::Error) -> GameError {
        GameError::persistence(format!("failed to {action} {}: {err}", self.path.display()))
    }
}

impl MoveStore for JsonLinesMoveStore {
    fn begin(&mut self, info: &MatchInfo) -> Result<(), GameError> {
        self.append(&LogEntry::Match(info.clone()))
    }

    fn record(&mut self, record: &MoveRecord) -> Result<(), GameError> {
        self.append(&LogEntry::Move(record.clone()))
    }

    fn matches(&self) -> Result<Vec<MatchInfo>, GameError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Match(info) => Some(info),
                LogEntry::Move(_) => None,
            })
            .collect())
    }

    fn moves(&self, match_id: Uuid) -> Result<Vec<MoveRecord>, GameError> {
        let mut moves: Vec<MoveRecord> = self
            .entries()?
            .into_iter()
            .filter_map(|entry| match entry {
                LogEntry::Move(m) if m.match_id == match_id => Some(m),
                _ => None,
            })
            .collect();
        moves.sort_by_key(|m| m.seq);
        Ok(moves)
    }
}

/// Play a recorded match back to `seats`.
///
/// Returns the final board. Moves are applied without re-validation, as they
/// were validated when first played.
pub fn replay<S: Seat>(
    info: &MatchInfo,
    moves: &[MoveRecord],
    seats: &mut [S],
    delay: Duration,
) -> Result<Board, GameError> {
    let mut board = info.variant.create_board(info.seat_count)?;
    let rules = info.variant.rules(BacktrackRule::default());

    for record in moves {
        rules.apply(&mut board, record.from, record.to)?;
        debug!(
            seq = record.seq,
            color = %record.color,
            from = %record.from,
            to = %record.to,
            "replayed move"
        );

        let line = frame(&board_notices(info.variant, &board));
        for seat in seats.iter_mut() {
            seat.send(&line)?;
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    Ok(board)
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod records_tests;
