//! Match coordinator
//!
//! Drives one match from `WELCOME` to the last placement. Exactly one seat
//! acts at a time: the coordinator sends it `YOU`, then reads and answers its
//! requests until the turn ends. The board and turn state are owned here and
//! nowhere else.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use checkers_core::{
    frame, validate_seat_count, BacktrackRule, Board, ClientRequest, Color, Coord, GameError,
    MoveClass, MovementStrategy, Seat, ServerNotice, TurnState, Variant,
};

use crate::records::{MatchInfo, MoveRecord, MoveStore};

/// How a match went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub match_id: Uuid,
    /// Seats in the order they finished, with their place.
    pub placements: Vec<(Color, u32)>,
    /// Moves applied over the whole match.
    pub moves: u32,
    /// False when the turn limit cut the match short.
    pub completed: bool,
}

/// The `BOARD` notice, followed by `KINGS` when the variant has kings.
pub fn board_notices(variant: Variant, board: &Board) -> Vec<ServerNotice> {
    let mut notices = vec![ServerNotice::Board(board.pieces())];
    if variant.has_kings() {
        notices.push(ServerNotice::Kings(board.kings()));
    }
    notices
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    TurnOver,
}

pub struct Coordinator {
    info: MatchInfo,
    seats: Vec<Box<dyn Seat>>,
    finished: Vec<bool>,
    board: Board,
    rules: Box<dyn MovementStrategy>,
    place: u32,
    placements: Vec<(Color, u32)>,
    moves: u32,
    max_turns: Option<u32>,
    store: Option<Box<dyn MoveStore>>,
}

impl Coordinator {
    /// Set up a match. Seats must arrive in seat order with the colours
    /// [`checkers_core::seat_colors`] assigns for their count.
    pub fn new(info: MatchInfo, seats: Vec<Box<dyn Seat>>) -> Result<Self, GameError> {
        let colors = validate_seat_count(seats.len())?;
        if info.seat_count != seats.len() {
            return Err(GameError::configuration(format!(
                "match expects {} seats, got {}",
                info.seat_count,
                seats.len()
            )));
        }
        for (seat, &expected) in seats.iter().zip(colors) {
            if seat.color() != expected {
                return Err(GameError::configuration(format!(
                    "seat {} plays {}, expected {expected}",
                    seat.name(),
                    seat.color()
                )));
            }
        }

        let board = info.variant.create_board(seats.len())?;
        let rules = info.variant.rules(BacktrackRule::default());
        Ok(Self {
            finished: vec![false; seats.len()],
            info,
            seats,
            board,
            rules,
            place: 1,
            placements: Vec::new(),
            moves: 0,
            max_turns: None,
            store: None,
        })
    }

    pub fn with_store(mut self, store: Box<dyn MoveStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Stop after this many turns instead of waiting for every seat to finish.
    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = Some(turns);
        self
    }

    /// Bots in the match should be built with the same rule.
    pub fn with_backtrack(mut self, rule: BacktrackRule) -> Self {
        self.rules = self.info.variant.rules(rule);
        self
    }

    pub fn info(&self) -> &MatchInfo {
        &self.info
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Play the match to the end.
    ///
    /// On a fatal error every seat is sent `ERROR` (best effort) before the
    /// error is returned.
    pub fn run(&mut self) -> Result<MatchSummary, GameError> {
        match self.play() {
            Ok(summary) => Ok(summary),
            Err(err) => {
                let message = match err {
                    GameError::PlayerLeft { .. } => "Someone left the game",
                    _ => "Connection lost",
                };
                warn!(match_id = %self.info.match_id, %err, "match aborted");
                let line = ServerNotice::Error(message.to_string()).to_string();
                for seat in &mut self.seats {
                    let _ = seat.send(&line);
                }
                Err(err)
            }
        }
    }

    fn play(&mut self) -> Result<MatchSummary, GameError> {
        info!(
            match_id = %self.info.match_id,
            variant = %self.info.variant,
            seats = self.seats.len(),
            bots = self.info.bots,
            "match started"
        );
        if let Some(store) = self.store.as_mut() {
            if let Err(err) = store.begin(&self.info) {
                warn!(%err, "failed to record match start");
            }
        }

        for seat in &mut self.seats {
            let welcome = ServerNotice::Welcome(seat.color()).to_string();
            seat.send(&welcome)?;
        }
        let mut start = vec![ServerNotice::Start];
        start.extend(self.board_notices());
        self.broadcast(&frame(&start))?;

        let mut current = 0;
        let mut turns = 0;
        loop {
            if self.max_turns.is_some_and(|limit| turns >= limit) {
                warn!(match_id = %self.info.match_id, turns, "turn limit reached");
                return Ok(self.summary(false));
            }
            self.play_turn(current)?;
            turns += 1;

            match self.next_seat(current) {
                Some(next) => current = next,
                None => break,
            }
        }

        info!(match_id = %self.info.match_id, moves = self.moves, "match ended");
        Ok(self.summary(true))
    }

    fn play_turn(&mut self, idx: usize) -> Result<(), GameError> {
        let mut turn = TurnState::new();
        debug!(color = %self.seats[idx].color(), "turn starts");
        self.seats[idx].send(&ServerNotice::You.to_string())?;

        loop {
            let request = self.seats[idx]
                .receive()
                .and_then(|line| ClientRequest::parse_line(&line));
            let flow = match request {
                Err(err) if err.is_fatal() => return Err(err),
                Ok(request) => self.handle(idx, request, &mut turn)?,
                Err(err) => {
                    warn!(seat = self.seats[idx].name(), %err, "rejected request");
                    self.send_to(idx, &[ServerNotice::Nok])?;
                    Flow::Continue
                }
            };
            if flow == Flow::TurnOver {
                return Ok(());
            }
        }
    }

    fn handle(
        &mut self,
        idx: usize,
        request: ClientRequest,
        turn: &mut TurnState,
    ) -> Result<Flow, GameError> {
        let color = self.seats[idx].color();
        debug!(%color, %request, "request");

        match request {
            ClientRequest::Skip => {
                self.send_to(idx, &[ServerNotice::Stop])?;
                self.broadcast_board()?;
                Ok(Flow::TurnOver)
            }
            ClientRequest::Clues(at) => {
                if self.board.color_at(at).ok() != Some(color) {
                    warn!(%color, %at, "clues for a cell the seat does not hold");
                    self.send_to(idx, &[ServerNotice::Nok])?;
                } else {
                    let destinations = self.rules.legal_destinations(&self.board, at, turn);
                    self.send_to(idx, &[ServerNotice::Clues(destinations)])?;
                }
                Ok(Flow::Continue)
            }
            ClientRequest::Move { from, to } => match self.check_move(color, from, to, turn) {
                Ok(class) => self.make_move(idx, from, to, class, turn),
                Err(err) => {
                    warn!(%color, %err, "move refused");
                    self.send_to(idx, &[ServerNotice::Nok])?;
                    Ok(Flow::Continue)
                }
            },
        }
    }

    fn check_move(
        &self,
        color: Color,
        from: Coord,
        to: Coord,
        turn: &TurnState,
    ) -> Result<MoveClass, GameError> {
        let owner = self.board.color_at(from)?;
        self.board.color_at(to)?;
        if owner != color {
            return Err(GameError::InvalidMove { from, to });
        }
        match self.rules.classify(&self.board, from, to, turn) {
            MoveClass::Illegal => Err(GameError::InvalidMove { from, to }),
            class => Ok(class),
        }
    }

    fn make_move(
        &mut self,
        idx: usize,
        from: Coord,
        to: Coord,
        class: MoveClass,
        turn: &mut TurnState,
    ) -> Result<Flow, GameError> {
        let color = self.seats[idx].color();
        self.rules.apply(&mut self.board, from, to)?;
        turn.record(from, to, class);
        self.record_move(color, from, to);

        if self.board.is_winner(color) {
            self.finished[idx] = true;
            self.placements.push((color, self.place));
            info!(%color, place = self.place, "player finished");
            self.send_to(idx, &[ServerNotice::End(self.place)])?;
            self.place += 1;
            self.broadcast_board()?;
            return Ok(Flow::TurnOver);
        }

        let can_continue = class == MoveClass::Jump
            && !self.rules.follow_up_jumps(&self.board, to, turn).is_empty();
        if !can_continue {
            self.send_to(idx, &[ServerNotice::Ok, ServerNotice::Stop])?;
            self.broadcast_board()?;
            return Ok(Flow::TurnOver);
        }

        let board = self.board_notices();
        let mut reply = vec![ServerNotice::Ok];
        reply.extend(board.iter().cloned());
        self.send_to(idx, &reply)?;

        let line = frame(&board);
        for (i, seat) in self.seats.iter_mut().enumerate() {
            if i != idx {
                seat.send(&line)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn record_move(&mut self, color: Color, from: Coord, to: Coord) {
        self.moves += 1;
        let Some(store) = self.store.as_mut() else {
            return;
        };
        let record = MoveRecord::new(self.info.match_id, self.moves, color, from, to);
        if let Err(err) = store.record(&record) {
            warn!(%err, seq = self.moves, "failed to record move");
        }
    }

    /// The next seat still playing after `current`, wrapping around.
    fn next_seat(&self, current: usize) -> Option<usize> {
        let n = self.seats.len();
        (1..=n)
            .map(|step| (current + step) % n)
            .find(|&i| !self.finished[i])
    }

    fn board_notices(&self) -> Vec<ServerNotice> {
        board_notices(self.info.variant, &self.board)
    }

    fn send_to(&mut self, idx: usize, notices: &[ServerNotice]) -> Result<(), GameError> {
        self.seats[idx].send(&frame(notices))
    }

    fn broadcast(&mut self, line: &str) -> Result<(), GameError> {
        for seat in &mut self.seats {
            seat.send(line)?;
        }
        Ok(())
    }

    fn broadcast_board(&mut self) -> Result<(), GameError> {
        let line = frame(&self.board_notices());
        self.broadcast(&line)
    }

    fn summary(&self, completed: bool) -> MatchSummary {
        MatchSummary {
            match_id: self.info.match_id,
            placements: self.placements.clone(),
            moves: self.moves,
            completed,
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod coordinator_tests;
