//! Move legality and execution.
//!
//! Both variants share one geometric core ([`DefaultMovement`]); the diamond
//! ruleset layers its king rule on top ([`DiamondMovement`]). The coordinator
//! picks one strategy per match and feeds it the current [`TurnState`].

use crate::board::Board;
use crate::error::GameError;
use crate::types::{Coord, MoveClass, Variant};

/// Which return hops are refused inside a jump chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BacktrackRule {
    /// Only the exact reverse of the previous hop is refused.
    #[default]
    Immediate,
    /// Also refuse landing where the chain started.
    ChainOrigin,
}

/// Validation state for the seat currently acting. Created fresh at the start
/// of each turn and dropped when the turn passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TurnState {
    /// Class of the last hop made this turn, `Illegal` if none yet.
    pub jump_class: MoveClass,
    /// Square the active pawn left on its most recent hop.
    pub active_pawn_origin: Option<Coord>,
    /// Where the active pawn currently stands.
    pub last_landing: Option<Coord>,
    /// Square the active pawn stood on before its first hop this turn.
    pub chain_origin: Option<Coord>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_chain(&self) -> bool {
        self.jump_class == MoveClass::Jump
    }

    /// A step always ends the turn.
    pub fn is_over(&self) -> bool {
        self.jump_class == MoveClass::Step
    }

    /// Book-keep a hop that was classified as `class` and then applied.
    pub fn record(&mut self, from: Coord, to: Coord, class: MoveClass) {
        if self.chain_origin.is_none() {
            self.chain_origin = Some(from);
        }
        self.jump_class = class;
        self.active_pawn_origin = Some(from);
        self.last_landing = Some(to);
    }
}

/// Pure geometry: is `to` one step or one jump away from `from`, and if a
/// jump, which cell is hopped over.
pub fn hop_geometry(from: Coord, to: Coord) -> Option<(MoveClass, Option<Coord>)> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let even = from.is_even_row();

    match (dy.abs(), dx.abs()) {
        (0, 1) => Some((MoveClass::Step, None)),
        (0, 2) => Some((MoveClass::Jump, Some(from.offset(dx / 2, 0)))),
        (1, _) => {
            let ok = if even {
                dx == 0 || dx == 1
            } else {
                dx == 0 || dx == -1
            };
            ok.then_some((MoveClass::Step, None))
        }
        (2, 1) => {
            let mid_x = match (even, dx < 0) {
                (true, true) => from.x,
                (true, false) => from.x + 1,
                (false, true) => from.x - 1,
                (false, false) => from.x,
            };
            Some((MoveClass::Jump, Some(Coord::new(mid_x, from.y + dy / 2))))
        }
        _ => None,
    }
}

/// A ruleset's notion of which hops are legal.
pub trait MovementStrategy: Send {
    /// Classify the hop `from -> to` given what already happened this turn.
    fn classify(&self, board: &Board, from: Coord, to: Coord, turn: &TurnState) -> MoveClass;

    /// Move the occupant of `from` to `to`. Callers classify first.
    fn apply(&self, board: &mut Board, from: Coord, to: Coord) -> Result<(), GameError> {
        let color = board.color_at(from)?;
        let king = board.is_king(from);
        board.place(to, color)?;
        board.set_king(to, king)?;
        board.clear(from)
    }

    fn variant(&self) -> Variant;

    /// Every square the piece on `from` may hop to right now.
    fn legal_destinations(&self, board: &Board, from: Coord, turn: &TurnState) -> Vec<Coord> {
        board
            .neighbors(from)
            .into_iter()
            .filter(|&to| self.classify(board, from, to, turn).is_legal())
            .collect()
    }

    /// Jumps the piece on `from` could chain into.
    fn follow_up_jumps(&self, board: &Board, from: Coord, turn: &TurnState) -> Vec<Coord> {
        board
            .neighbors(from)
            .into_iter()
            .filter(|&to| self.classify(board, from, to, turn) == MoveClass::Jump)
            .collect()
    }
}

/// Classic rules: single steps to adjacent cells, or jumps over one occupied
/// cell, chaining jumps with the same pawn.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMovement {
    pub backtrack: BacktrackRule,
}

impl DefaultMovement {
    pub fn new(backtrack: BacktrackRule) -> Self {
        Self { backtrack }
    }

    fn violates_chain(&self, from: Coord, to: Coord, turn: &TurnState) -> bool {
        if turn.is_over() {
            return true;
        }
        if !turn.in_chain() {
            return false;
        }
        if turn.last_landing != Some(from) {
            return true;
        }
        if turn.active_pawn_origin == Some(to) {
            return true;
        }
        self.backtrack == BacktrackRule::ChainOrigin && turn.chain_origin == Some(to)
    }
}

impl MovementStrategy for DefaultMovement {
    fn classify(&self, board: &Board, from: Coord, to: Coord, turn: &TurnState) -> MoveClass {
        if !board.is_playable(from) || !board.is_playable(to) {
            return MoveClass::Illegal;
        }
        if !board.is_occupied(from) || board.is_occupied(to) {
            return MoveClass::Illegal;
        }
        if self.violates_chain(from, to, turn) {
            return MoveClass::Illegal;
        }

        match hop_geometry(from, to) {
            Some((MoveClass::Step, _)) if turn.in_chain() => MoveClass::Illegal,
            Some((MoveClass::Step, _)) => MoveClass::Step,
            Some((MoveClass::Jump, Some(over))) if board.is_occupied(over) => MoveClass::Jump,
            _ => MoveClass::Illegal,
        }
    }

    fn variant(&self) -> Variant {
        Variant::Default
    }
}

/// Diamond rules: common pieces treat kings as walls they can neither land on
/// nor hop over. Kings move under the shared geometry.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiamondMovement {
    base: DefaultMovement,
}

impl DiamondMovement {
    pub fn new(backtrack: BacktrackRule) -> Self {
        Self {
            base: DefaultMovement::new(backtrack),
        }
    }
}

impl MovementStrategy for DiamondMovement {
    fn classify(&self, board: &Board, from: Coord, to: Coord, turn: &TurnState) -> MoveClass {
        let class = self.base.classify(board, from, to, turn);
        if !class.is_legal() || board.is_king(from) {
            return class;
        }
        if board.is_king(to) {
            return MoveClass::Illegal;
        }
        match hop_geometry(from, to) {
            Some((MoveClass::Jump, Some(over))) if board.is_king(over) => MoveClass::Illegal,
            _ => class,
        }
    }

    fn variant(&self) -> Variant {
        Variant::Diamond
    }
}

/// The movement strategy for `variant`.
pub fn rules_for(variant: Variant, backtrack: BacktrackRule) -> Box<dyn MovementStrategy> {
    match variant {
        Variant::Default => Box::new(DefaultMovement::new(backtrack)),
        Variant::Diamond => Box::new(DiamondMovement::new(backtrack)),
    }
}

impl Variant {
    pub fn rules(self, backtrack: BacktrackRule) -> Box<dyn MovementStrategy> {
        rules_for(self, backtrack)
    }
}

#[cfg(test)]
#[path = "movement_tests.rs"]
mod movement_tests;
