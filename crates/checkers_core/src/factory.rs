//! Builds the starting board for a variant and seat count.
//!
//! The star is carved out of a 13x17 rectangle: six ten-cell arms plus a
//! central hexagon spanning rows 5 to 13.

use tracing::debug;

use crate::board::{Board, Cell};
use crate::error::GameError;
use crate::types::{seat_colors, Color, Coord, Variant};

const fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

/// Arm cells per colour. The first entry is the arm's apex, which is also
/// where the diamond variant puts the king.
#[rustfmt::skip]
const GREEN_ARM: [Coord; 10] = [
    c(7, 1), c(6, 2), c(7, 2), c(6, 3), c(7, 3), c(8, 3), c(5, 4), c(6, 4), c(7, 4), c(8, 4),
];
#[rustfmt::skip]
const RED_ARM: [Coord; 10] = [
    c(7, 17), c(6, 16), c(7, 16), c(6, 15), c(7, 15), c(8, 15), c(5, 14), c(6, 14), c(7, 14), c(8, 14),
];
#[rustfmt::skip]
const BLUE_ARM: [Coord; 10] = [
    c(1, 5), c(2, 5), c(3, 5), c(4, 5), c(1, 6), c(2, 6), c(3, 6), c(2, 7), c(3, 7), c(2, 8),
];
#[rustfmt::skip]
const VIOLET_ARM: [Coord; 10] = [
    c(1, 13), c(2, 10), c(2, 11), c(3, 11), c(1, 12), c(2, 12), c(3, 12), c(2, 13), c(3, 13), c(4, 13),
];
#[rustfmt::skip]
const YELLOW_ARM: [Coord; 10] = [
    c(13, 5), c(10, 5), c(11, 5), c(12, 5), c(10, 6), c(11, 6), c(12, 6), c(11, 7), c(12, 7), c(11, 8),
];
#[rustfmt::skip]
const ORANGE_ARM: [Coord; 10] = [
    c(13, 13), c(11, 10), c(11, 11), c(12, 11), c(10, 12), c(11, 12), c(12, 12), c(10, 13), c(11, 13), c(12, 13),
];

/// First and last playable column for rows 5..=13.
const CENTER_SPANS: [(i32, i32); 9] = [
    (5, 9),
    (4, 9),
    (4, 10),
    (3, 10),
    (3, 11),
    (3, 10),
    (4, 10),
    (4, 9),
    (5, 9),
];
const CENTER_FIRST_ROW: i32 = 5;

/// The ten cells of `color`'s arm. Empty for `Color::None`.
pub fn arm_cells(color: Color) -> &'static [Coord] {
    match color {
        Color::Green => &GREEN_ARM,
        Color::Red => &RED_ARM,
        Color::Blue => &BLUE_ARM,
        Color::Violet => &VIOLET_ARM,
        Color::Yellow => &YELLOW_ARM,
        Color::Orange => &ORANGE_ARM,
        Color::None => &[],
    }
}

/// The outermost point of `color`'s arm.
pub fn arm_apex(color: Color) -> Option<Coord> {
    arm_cells(color).first().copied()
}

/// Reject seat counts the star has no fair layout for.
pub fn validate_seat_count(seats: usize) -> Result<&'static [Color], GameError> {
    seat_colors(seats).ok_or_else(|| {
        GameError::configuration(format!(
            "invalid number of players: {seats} (expected 1, 2, 3, 4 or 6)"
        ))
    })
}

/// Build a populated board for `seats` players under `variant`.
pub fn create_board(variant: Variant, seats: usize) -> Result<Board, GameError> {
    let active = validate_seat_count(seats)?;
    let mut board = Board::new(Board::COLUMNS, Board::ROWS);

    for arm in Color::PLAYERS {
        let in_game = active.contains(&arm);
        let occupant = if in_game { arm } else { Color::None };
        for (i, &coord) in arm_cells(arm).iter().enumerate() {
            let mut cell = Cell::arm(arm, variant.target_of(arm), occupant);
            cell.king = in_game && variant.has_kings() && i == 0;
            board.set_cell(coord, cell)?;
        }
    }

    for (row_offset, &(first, last)) in CENTER_SPANS.iter().enumerate() {
        let y = CENTER_FIRST_ROW + row_offset as i32;
        for x in first..=last {
            board.set_cell(Coord::new(x, y), Cell::NEUTRAL)?;
        }
    }

    debug!(%variant, seats, "board created");
    Ok(board)
}

impl Variant {
    /// Starting board for this variant.
    pub fn create_board(self, seats: usize) -> Result<Board, GameError> {
        create_board(self, seats)
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod factory_tests;
