//! Line-oriented text protocol.
//!
//! A line carries one or more messages joined by `@`. Each message is a
//! command code followed by space-separated arguments, which are sorted into
//! integers and words. Framing is kept apart from move legality: this module
//! only turns text into typed requests/notices and back.

use std::fmt;

use crate::error::GameError;
use crate::types::{Color, Coord};

pub const SEPARATOR: char = '@';

/// One `@`-delimited message, split into its code and classified arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub code: String,
    pub numbers: Vec<i32>,
    pub words: Vec<String>,
    /// Arguments in their original order.
    pub args: Vec<String>,
}

impl Message {
    pub fn parse(segment: &str) -> Option<Self> {
        let mut tokens = segment.split_whitespace();
        let code = tokens.next()?.to_string();
        let mut numbers = Vec::new();
        let mut words = Vec::new();
        let mut args = Vec::new();
        for token in tokens {
            args.push(token.to_string());
            match token.parse::<i32>() {
                Ok(n) => numbers.push(n),
                Err(_) => words.push(token.to_string()),
            }
        }
        Some(Message {
            code,
            numbers,
            words,
            args,
        })
    }
}

/// Split a raw line into its messages. Blank segments are dropped.
pub fn split_line(line: &str) -> Vec<Message> {
    line.trim_end_matches(['\r', '\n'])
        .split(SEPARATOR)
        .filter_map(Message::parse)
        .collect()
}

/// Join already-rendered messages into one line.
pub fn join<I, S>(messages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, m) in messages.into_iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(m.as_ref());
    }
    out
}

/// What a seat may ask for while it holds the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientRequest {
    Skip,
    Clues(Coord),
    Move { from: Coord, to: Coord },
}

impl ClientRequest {
    /// Parse a full line. Exactly one well-formed message is accepted.
    pub fn parse_line(line: &str) -> Result<Self, GameError> {
        let messages = split_line(line);
        match messages.as_slice() {
            [only] => Self::from_message(only).ok_or_else(|| GameError::malformed(line)),
            _ => Err(GameError::malformed(line)),
        }
    }

    fn from_message(msg: &Message) -> Option<Self> {
        if !msg.words.is_empty() {
            return None;
        }
        match (msg.code.as_str(), msg.numbers.as_slice()) {
            ("SKIP", []) => Some(ClientRequest::Skip),
            ("CLUES", &[x, y]) => Some(ClientRequest::Clues(Coord::new(x, y))),
            ("MOVE", &[x1, y1, x2, y2]) => Some(ClientRequest::Move {
                from: Coord::new(x1, y1),
                to: Coord::new(x2, y2),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for ClientRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientRequest::Skip => f.write_str("SKIP"),
            ClientRequest::Clues(c) => write!(f, "CLUES {c}"),
            ClientRequest::Move { from, to } => write!(f, "MOVE {from} {to}"),
        }
    }
}

/// Everything the server sends to seats.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServerNotice {
    Welcome(Color),
    Start,
    You,
    Board(Vec<(Color, Coord)>),
    /// Diamond only: cells currently holding a king. Follows `BOARD`.
    Kings(Vec<Coord>),
    Clues(Vec<Coord>),
    Ok,
    Nok,
    Stop,
    End(u32),
    Error(String),
}

impl ServerNotice {
    /// Parse every message of a server line. Unknown codes are an error so a
    /// client notices protocol drift.
    pub fn parse_line(line: &str) -> Result<Vec<Self>, GameError> {
        split_line(line)
            .iter()
            .map(|m| Self::from_message(m).ok_or_else(|| GameError::malformed(line)))
            .collect()
    }

    fn from_message(msg: &Message) -> Option<Self> {
        let notice = match msg.code.as_str() {
            "WELCOME" => ServerNotice::Welcome(msg.words.first()?.parse().ok()?),
            "START" => ServerNotice::Start,
            "YOU" => ServerNotice::You,
            "BOARD" => ServerNotice::Board(parse_board_args(msg)?),
            "KINGS" => ServerNotice::Kings(pairs(&msg.numbers)?),
            "CLUES" => ServerNotice::Clues(pairs(&msg.numbers)?),
            "OK" => ServerNotice::Ok,
            "NOK" => ServerNotice::Nok,
            "STOP" => ServerNotice::Stop,
            "END" => ServerNotice::End(u32::try_from(*msg.numbers.first()?).ok()?),
            "ERROR" => ServerNotice::Error(msg.args.join(" ")),
            _ => return None,
        };
        Some(notice)
    }
}

fn pairs(numbers: &[i32]) -> Option<Vec<Coord>> {
    if numbers.len() % 2 != 0 {
        return None;
    }
    Some(
        numbers
            .chunks_exact(2)
            .map(|p| Coord::new(p[0], p[1]))
            .collect(),
    )
}

/// `BOARD` arguments come in `COLOR x y` triples.
fn parse_board_args(msg: &Message) -> Option<Vec<(Color, Coord)>> {
    if msg.args.len() % 3 != 0 {
        return None;
    }
    msg.args
        .chunks_exact(3)
        .map(|t| {
            let color = t[0].parse().ok()?;
            let x = t[1].parse().ok()?;
            let y = t[2].parse().ok()?;
            Some((color, Coord::new(x, y)))
        })
        .collect()
}

fn write_coords(f: &mut fmt::Formatter<'_>, code: &str, coords: &[Coord]) -> fmt::Result {
    f.write_str(code)?;
    for c in coords {
        write!(f, " {c}")?;
    }
    Ok(())
}

impl fmt::Display for ServerNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerNotice::Welcome(color) => write!(f, "WELCOME {color}"),
            ServerNotice::Start => f.write_str("START"),
            ServerNotice::You => f.write_str("YOU"),
            ServerNotice::Board(pieces) => {
                f.write_str("BOARD")?;
                for (color, c) in pieces {
                    write!(f, " {color} {c}")?;
                }
                Ok(())
            }
            ServerNotice::Kings(coords) => write_coords(f, "KINGS", coords),
            ServerNotice::Clues(coords) => write_coords(f, "CLUES", coords),
            ServerNotice::Ok => f.write_str("OK"),
            ServerNotice::Nok => f.write_str("NOK"),
            ServerNotice::Stop => f.write_str("STOP"),
            ServerNotice::End(place) => write!(f, "END {place}"),
            ServerNotice::Error(message) => write!(f, "ERROR {message}"),
        }
    }
}

/// Render several notices as a single `@`-joined line.
pub fn frame(notices: &[ServerNotice]) -> String {
    join(notices.iter().map(ToString::to_string))
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod protocol_tests;
