//! Greedy Chinese Checkers Bot
//!
//! A bot seat that answers the server like a connected player would. It keeps
//! a mirror of the board from the `BOARD`/`KINGS` broadcasts, and when asked
//! for a request it scores every legal hop by how much closer it brings the
//! piece to its goal, then plays the best one.
//!
//! - Goal: the apex of the arm the bot is racing to.
//! - Tie-breaking: candidates are shuffled with a seeded RNG before a stable
//!   sort, so equal scores resolve reproducibly.
//! - Stray mode: after repeated turns without a productive hop, the bot
//!   leaves its settled pieces alone and aims at the nearest open home cell.

use std::time::Duration;

use checkers_core::{
    arm_apex, create_board, BacktrackRule, Board, ClientRequest, Color, Coord, GameError,
    MoveClass, MovementStrategy, Seat, ServerNotice, TurnState, Variant,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

#[cfg(test)]
mod lib_tests;

/// Consecutive idle turns tolerated before stray mode kicks in.
const STALL_LIMIT: u32 = 1;

/// One scored hop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub from: Coord,
    pub to: Coord,
    pub class: MoveClass,
    /// Distance to the goal before the hop minus distance after it.
    pub score: f64,
}

pub struct GreedyBot {
    color: Color,
    name: String,
    rules: Box<dyn MovementStrategy>,
    board: Board,
    turn: TurnState,
    apex: Coord,
    stray: bool,
    stray_target: Option<Coord>,
    stall_count: u32,
    moved_this_turn: bool,
    rejected: bool,
    delay: Duration,
    rng: StdRng,
}

impl GreedyBot {
    /// A bot playing `color` in a `seats`-player match of `variant`.
    ///
    /// `delay` is slept before every answer; `seed` fixes tie-breaking. The
    /// bot assumes [`BacktrackRule::Immediate`] chains until told otherwise
    /// with [`GreedyBot::with_backtrack`].
    pub fn new(
        color: Color,
        variant: Variant,
        seats: usize,
        delay: Duration,
        seed: u64,
    ) -> Result<Self, GameError> {
        let apex = arm_apex(variant.home_arm(color)).ok_or_else(|| {
            GameError::configuration(format!("a bot cannot play colour {color}"))
        })?;
        Ok(Self {
            color,
            name: format!("bot-{color}"),
            rules: variant.rules(BacktrackRule::default()),
            board: create_board(variant, seats)?,
            turn: TurnState::new(),
            apex,
            stray: false,
            stray_target: None,
            stall_count: 0,
            moved_this_turn: false,
            rejected: false,
            delay,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Plan chains under the same backtrack rule as the coordinator.
    pub fn with_backtrack(mut self, rule: BacktrackRule) -> Self {
        self.rules = self.rules.variant().rules(rule);
        self
    }

    /// The bot's current picture of the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_stray(&self) -> bool {
        self.stray
    }

    pub fn stall_count(&self) -> u32 {
        self.stall_count
    }

    /// Where the bot is currently steering its pieces.
    pub fn target(&self) -> Coord {
        match self.stray_target {
            Some(t) if self.stray => t,
            _ => self.apex,
        }
    }

    /// Every legal hop for the bot's pieces, best first.
    pub fn candidates(&mut self) -> Vec<Candidate> {
        let target = self.target();
        let (board, turn) = (&self.board, &self.turn);
        let mut candidates = Vec::new();

        for from in board.pieces_of(self.color) {
            if self.stray && self.is_home(from) {
                continue;
            }
            for to in self.rules.legal_destinations(board, from, turn) {
                candidates.push(Candidate {
                    from,
                    to,
                    class: self.rules.classify(board, from, to, turn),
                    score: from.distance(target) - to.distance(target),
                });
            }
        }

        candidates.shuffle(&mut self.rng);
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    /// Pick the next request for the current turn.
    pub fn decide(&mut self) -> ClientRequest {
        if std::mem::take(&mut self.rejected) {
            debug!(color = %self.color, "last request refused, passing");
            return ClientRequest::Skip;
        }

        if self.stray {
            self.refresh_stray_target();
        }

        let candidates = self.candidates();
        debug!(
            color = %self.color,
            count = candidates.len(),
            best = ?candidates.first(),
            "listed candidates"
        );

        match candidates.first() {
            Some(best) if best.score > 0.0 => {
                self.stall_count = 0;
                self.moved_this_turn = true;
                self.turn.record(best.from, best.to, best.class);
                ClientRequest::Move {
                    from: best.from,
                    to: best.to,
                }
            }
            _ => {
                if !self.moved_this_turn {
                    self.stall_count += 1;
                    if self.stall_count > STALL_LIMIT && !self.stray {
                        self.enter_stray_mode();
                    }
                }
                ClientRequest::Skip
            }
        }
    }

    fn is_home(&self, c: Coord) -> bool {
        self.board
            .cell(c)
            .is_some_and(|cell| cell.target == self.color)
    }

    fn enter_stray_mode(&mut self) {
        self.stray = true;
        self.refresh_stray_target();
        info!(color = %self.color, target = ?self.stray_target, "bot entering stray mode");
    }

    /// Keep the stray target on an empty home cell, nearest the apex first.
    fn refresh_stray_target(&mut self) {
        if let Some(t) = self.stray_target {
            if !self.board.is_occupied(t) {
                return;
            }
        }
        let apex = self.apex;
        self.stray_target = self
            .board
            .playable_coords()
            .filter(|&c| self.is_home(c) && !self.board.is_occupied(c))
            .min_by(|a, b| a.distance(apex).total_cmp(&b.distance(apex)));
    }

    fn observe(&mut self, notice: ServerNotice) -> Result<(), GameError> {
        match notice {
            ServerNotice::You => {
                self.turn = TurnState::new();
                self.moved_this_turn = false;
                self.rejected = false;
            }
            ServerNotice::Board(pieces) => self.board.load_pieces(&pieces)?,
            ServerNotice::Kings(kings) => self.board.load_kings(&kings)?,
            ServerNotice::Nok => self.rejected = true,
            ServerNotice::End(place) => {
                info!(color = %self.color, place, "bot finished");
            }
            _ => {}
        }
        Ok(())
    }
}

impl Seat for GreedyBot {
    fn color(&self) -> Color {
        self.color
    }

    fn send(&mut self, line: &str) -> Result<(), GameError> {
        for notice in ServerNotice::parse_line(line)? {
            self.observe(notice)?;
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<String, GameError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(self.decide().to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
