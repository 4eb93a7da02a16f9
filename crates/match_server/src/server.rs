//! TCP front end: wait for the human seats, fill the rest with bots, play,
//! repeat.

use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use checkers_core::{validate_seat_count, GameError, Seat};
use greedy_bot::GreedyBot;

use crate::config::ServerConfig;
use crate::coordinator::{Coordinator, MatchSummary};
use crate::records::{JsonLinesMoveStore, MatchInfo};
use crate::seat::StreamSeat;

/// Pause after a transport failure so a broken listener does not spin.
const IO_BACKOFF: Duration = Duration::from_millis(500);

/// Serve matches forever. Returns only on a configuration or bind failure.
pub fn serve(config: &ServerConfig) -> Result<(), GameError> {
    config.validate()?;
    let listener = TcpListener::bind(&config.bind)?;
    info!(addr = %config.bind, seats = config.seats, bots = config.bots, "listening");

    loop {
        match host_match(&listener, config) {
            Ok(summary) => info!(
                match_id = %summary.match_id,
                moves = summary.moves,
                placements = ?summary.placements,
                "match finished"
            ),
            Err(err @ GameError::Configuration { .. }) => return Err(err),
            Err(err) => {
                warn!(%err, "match ended early");
                thread::sleep(backoff_after(&err));
            }
        }
    }
}

/// How long to wait before accepting again after a failed match. Players
/// leaving is routine; socket errors may repeat immediately.
fn backoff_after(err: &GameError) -> Duration {
    match err {
        GameError::Io(_) => IO_BACKOFF,
        _ => Duration::ZERO,
    }
}

/// Accept the human seats for one match and play it.
pub fn host_match(
    listener: &TcpListener,
    config: &ServerConfig,
) -> Result<MatchSummary, GameError> {
    let variant = config.variant()?;
    let colors = validate_seat_count(config.seats)?;
    let info = MatchInfo::new(variant, config.seats, config.bots);
    let humans = config.humans();

    let mut seats: Vec<Box<dyn Seat>> = Vec::with_capacity(config.seats);
    for &color in &colors[..humans] {
        let (stream, peer) = listener.accept()?;
        info!(%peer, %color, "player connected");
        seats.push(Box::new(StreamSeat::tcp(color, stream)?));
    }
    for (i, &color) in colors[humans..].iter().enumerate() {
        let seed = info.seed().wrapping_add(i as u64);
        let bot = GreedyBot::new(color, variant, config.seats, config.bot_delay(), seed)?;
        seats.push(Box::new(bot));
    }

    let mut coordinator = Coordinator::new(info, seats)?;
    if let Some(path) = &config.record_path {
        coordinator = coordinator.with_store(Box::new(JsonLinesMoveStore::new(path)));
    }
    coordinator.run()
}
