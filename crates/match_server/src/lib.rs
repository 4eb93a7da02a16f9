//! Match server for Chinese Checkers
//!
//! This crate hosts matches over TCP:
//! - The coordinator that runs turns and enforces the rules
//! - Socket-backed seats and bot seats behind one `Seat` interface
//! - Move records, a JSON-lines store and replay
//!
//! # Usage
//!
//! ```bash
//! # Two humans against one bot on the diamond board
//! cargo run -p match_server -- serve --seats 3 --bots 1 --variant diamond
//!
//! # Replay the last recorded match
//! cargo run -p match_server -- replay moves.jsonl
//! ```

mod config;
mod coordinator;
mod records;
mod seat;
mod server;

pub use config::*;
pub use coordinator::*;
pub use records::*;
pub use seat::*;
pub use server::*;
